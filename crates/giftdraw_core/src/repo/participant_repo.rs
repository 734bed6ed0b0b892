//! Participant repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the participant store used by services: list, get, create,
//!   update, full reset and batch assignment replacement.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Participant::validate()` before SQL mutations.
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::{inspect_schema, DbError, SchemaState};
use crate::model::participant::{
    Participant, ParticipantId, ParticipantValidationError, WishlistItem,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PARTICIPANT_SELECT_SQL: &str = "SELECT uuid, name, recipient_uuid FROM participants";

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    text,
    purchased,
    purchased_by
FROM wishlist_items
WHERE participant_uuid = ?1
ORDER BY position ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for participant persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ParticipantValidationError),
    Db(DbError),
    NotFound(ParticipantId),
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "participant not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted participant data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "participant repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ParticipantValidationError> for RepoError {
    fn from(value: ParticipantValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One giver → recipient pair produced by a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub giver: ParticipantId,
    pub recipient: ParticipantId,
}

/// Repository interface for the participant store.
pub trait ParticipantRepository {
    /// Lists every participant in registration order.
    fn list_participants(&self) -> RepoResult<Vec<Participant>>;
    fn get_participant(&self, id: ParticipantId) -> RepoResult<Option<Participant>>;
    fn create_participant(&self, participant: &Participant) -> RepoResult<ParticipantId>;
    /// Replaces name, assignment and wishlist of an existing participant.
    fn update_participant(&self, participant: &Participant) -> RepoResult<()>;
    /// Removes all participants and their wishlists. Returns removed count.
    fn delete_all(&self) -> RepoResult<usize>;
    /// Clears every assignment, then writes `assignments`, atomically.
    fn replace_assignments(&self, assignments: &[Assignment]) -> RepoResult<()>;
}

/// SQLite-backed participant repository.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    /// Creates a repository over a fully migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        match inspect_schema(conn)? {
            SchemaState::Current => Ok(Self { conn }),
            SchemaState::Behind { db_version } | SchemaState::Ahead { db_version } => {
                Err(RepoError::UninitializedConnection {
                    expected_version: latest_version(),
                    actual_version: db_version,
                })
            }
        }
    }
}

impl ParticipantRepository for SqliteParticipantRepository<'_> {
    fn list_participants(&self) -> RepoResult<Vec<Participant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARTICIPANT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut participants = Vec::new();

        while let Some(row) = rows.next()? {
            participants.push(parse_participant_row(self.conn, row)?);
        }

        Ok(participants)
    }

    fn get_participant(&self, id: ParticipantId) -> RepoResult<Option<Participant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARTICIPANT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_participant_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn create_participant(&self, participant: &Participant) -> RepoResult<ParticipantId> {
        participant.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO participants (uuid, name, recipient_uuid) VALUES (?1, ?2, ?3);",
            params![
                participant.id.to_string(),
                participant.name.as_str(),
                participant.assigned_recipient.map(|id| id.to_string()),
            ],
        )?;
        insert_items(&tx, participant)?;
        tx.commit()?;

        Ok(participant.id)
    }

    fn update_participant(&self, participant: &Participant) -> RepoResult<()> {
        participant.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE participants
             SET
                name = ?1,
                recipient_uuid = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                participant.name.as_str(),
                participant.assigned_recipient.map(|id| id.to_string()),
                participant.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(participant.id));
        }

        tx.execute(
            "DELETE FROM wishlist_items WHERE participant_uuid = ?1;",
            [participant.id.to_string()],
        )?;
        insert_items(&tx, participant)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM wishlist_items;", [])?;
        let removed = tx.execute("DELETE FROM participants;", [])?;
        tx.commit()?;
        Ok(removed)
    }

    fn replace_assignments(&self, assignments: &[Assignment]) -> RepoResult<()> {
        if let Some(invalid) = assignments.iter().find(|pair| pair.giver == pair.recipient) {
            return Err(RepoError::Validation(
                ParticipantValidationError::SelfAssignment(invalid.giver),
            ));
        }

        // Dropping `tx` without commit rolls back every write below.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE participants
             SET
                recipient_uuid = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE recipient_uuid IS NOT NULL;",
            [],
        )?;

        for pair in assignments {
            let changed = tx.execute(
                "UPDATE participants
                 SET
                    recipient_uuid = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1
                   AND EXISTS (SELECT 1 FROM participants WHERE uuid = ?2);",
                params![pair.giver.to_string(), pair.recipient.to_string()],
            )?;
            if changed == 0 {
                let missing = if participant_exists(&tx, pair.giver)? {
                    pair.recipient
                } else {
                    pair.giver
                };
                return Err(RepoError::NotFound(missing));
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn insert_items(tx: &Transaction<'_>, participant: &Participant) -> RepoResult<()> {
    let owner = participant.id.to_string();
    for (position, item) in participant.wishlist.iter().enumerate() {
        tx.execute(
            "INSERT INTO wishlist_items (
                uuid,
                participant_uuid,
                position,
                text,
                purchased,
                purchased_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                item.id.to_string(),
                owner.as_str(),
                position as i64,
                item.text.as_str(),
                bool_to_int(item.purchased),
                item.purchased_by.map(|id| id.to_string()),
            ],
        )?;
    }
    Ok(())
}

fn participant_exists(conn: &Connection, id: ParticipantId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM participants WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_participant_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Participant> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "participants.uuid")?;
    let assigned_recipient = match row.get::<_, Option<String>>("recipient_uuid")? {
        Some(value) => Some(parse_uuid(&value, "participants.recipient_uuid")?),
        None => None,
    };

    let participant = Participant {
        id,
        name: row.get("name")?,
        assigned_recipient,
        wishlist: load_items(conn, &uuid_text)?,
    };
    participant.validate()?;
    Ok(participant)
}

fn load_items(conn: &Connection, owner: &str) -> RepoResult<Vec<WishlistItem>> {
    let mut stmt = conn.prepare(ITEM_SELECT_SQL)?;
    let mut rows = stmt.query([owner])?;
    let mut items = Vec::new();

    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        let purchased = match row.get::<_, i64>("purchased")? {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid purchased value `{other}` in wishlist_items.purchased"
                )));
            }
        };
        let purchased_by = match row.get::<_, Option<String>>("purchased_by")? {
            Some(value) => Some(parse_uuid(&value, "wishlist_items.purchased_by")?),
            None => None,
        };

        items.push(WishlistItem {
            id: parse_uuid(&uuid_text, "wishlist_items.uuid")?,
            text: row.get("text")?,
            purchased,
            purchased_by,
        });
    }

    Ok(items)
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
