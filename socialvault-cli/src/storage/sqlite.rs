use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::debug;

use socialvault_core::error::VaultError;

/// Shared SQLite connection.
///
/// Synchronous rusqlite calls are run through `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    /// Open (or create) the database at `db_path` and apply `schema`.
    pub fn open(db_path: &Path, schema: &str) -> Result<Self, VaultError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VaultError::Storage(format!("create db dir failed: {e}")))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| VaultError::Storage(format!("open SQLite DB failed: {e}")))?;

        // WAL for concurrent readers (history listing while a backup records).
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| VaultError::Storage(format!("set WAL mode failed: {e}")))?;
        conn.execute_batch(schema)
            .map_err(|e| VaultError::Storage(format!("apply schema failed: {e}")))?;

        debug!("Opened SQLite DB at {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T, VaultError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, VaultError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            f(&mut conn)
        })
        .await
        .map_err(|e| VaultError::Storage(format!("spawn_blocking failed: {e}")))?
    }
}
