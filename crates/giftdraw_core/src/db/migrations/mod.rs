//! Participant schema migrations.
//!
//! # Responsibility
//! - Own the ordered list of participant-store schema steps.
//! - Report whether a connection is behind, current, or ahead of this binary.
//! - Bring a connection up to date inside one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` always equals the last step applied.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "participants",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "wishlist_items",
        sql: include_str!("0002_wishlist_items.sql"),
    },
];

/// Where a connection's schema stands relative to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    /// Steps after `db_version` still need to run.
    Behind { db_version: u32 },
    /// Written by a newer binary; must not be touched.
    Ahead { db_version: u32 },
}

/// Returns the schema version this binary migrates to.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Compares the connection's recorded version with [`latest_version`].
pub fn inspect_schema(conn: &Connection) -> DbResult<SchemaState> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    Ok(if db_version == latest {
        SchemaState::Current
    } else if db_version < latest {
        SchemaState::Behind { db_version }
    } else {
        SchemaState::Ahead { db_version }
    })
}

/// Runs every pending step and returns how many were applied.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is ahead of this binary.
/// - `MigrationFailed` naming the step whose SQL failed; nothing is applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let db_version = match inspect_schema(conn)? {
        SchemaState::Current => return Ok(0),
        SchemaState::Behind { db_version } => db_version,
        SchemaState::Ahead { db_version } => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported: latest_version(),
            })
        }
    };

    let tx = conn.transaction()?;
    let pending = SCHEMA_STEPS.iter().filter(|step| step.version > db_version);
    let mut applied = 0;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::MigrationFailed {
                version: step.version,
                name: step.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
        applied += 1;
    }
    tx.commit()?;

    Ok(applied)
}
