use std::sync::{Arc, Mutex};

use giftdraw_core::db::{open_db, open_db_in_memory, DbError};
use giftdraw_core::SqliteParticipantRepository;
use rusqlite::Connection;

use super::{config::Config, error::AppError};

/// Shared server state.
///
/// The single connection sits behind a mutex that is held for the whole use
/// case, so draws, resets and wishlist edits never interleave their writes.
pub struct AppState {
    pub config: Config,
    connection: Mutex<Connection>,
}

impl AppState {
    /// Opens the configured store and wraps it for sharing across handlers.
    pub fn new(config: Config) -> Result<Arc<Self>, DbError> {
        let connection = if config.is_in_memory() {
            open_db_in_memory()?
        } else {
            open_db(&config.db_path)?
        };
        Ok(Self::with_connection(config, connection))
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(config: Config, connection: Connection) -> Arc<Self> {
        Arc::new(Self {
            config,
            connection: Mutex::new(connection),
        })
    }

    /// Runs `work` against a repository on a blocking worker thread while
    /// holding the connection lock.
    pub async fn run<T, F>(self: &Arc<Self>, work: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(SqliteParticipantRepository<'_>) -> Result<T, AppError> + Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let connection = state
                .connection
                .lock()
                .map_err(|_| AppError::InternalError("connection lock poisoned".to_string()))?;
            let repo = SqliteParticipantRepository::try_new(&connection)?;
            work(repo)
        })
        .await
        .map_err(|err| AppError::InternalError(format!("blocking task failed: {err}")))?
    }
}
