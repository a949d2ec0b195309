use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use socialvault_core::error::VaultError;

use super::sqlite::SqliteDb;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS platform_links (
    platform   TEXT PRIMARY KEY,
    connected  INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);";

/// Which platforms the user has linked, persisted in SQLite.
///
/// A platform with no row has never been connected.
pub struct SqlitePlatforms {
    db: SqliteDb,
}

impl SqlitePlatforms {
    pub fn open(db_path: &Path) -> Result<Self, VaultError> {
        Ok(Self {
            db: SqliteDb::open(db_path, SCHEMA)?,
        })
    }

    /// Mark `platform` connected or disconnected as of `now` (Unix ms).
    pub async fn set_connected(
        &self,
        platform: &str,
        connected: bool,
        now: u64,
    ) -> Result<(), VaultError> {
        let platform = platform.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO platform_links (platform, connected, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(platform) DO UPDATE
                     SET connected = excluded.connected, updated_at = excluded.updated_at",
                    rusqlite::params![platform, connected, now as i64],
                )
                .map_err(|e| VaultError::Storage(format!("update platform link failed: {e}")))?;

                debug!("Platform {} connected: {}", platform, connected);
                Ok(())
            })
            .await
    }

    pub async fn is_connected(&self, platform: &str) -> Result<bool, VaultError> {
        Ok(self.connections().await?.get(platform).copied().unwrap_or(false))
    }

    /// Connection flag for every platform that has ever been linked.
    pub async fn connections(&self) -> Result<HashMap<String, bool>, VaultError> {
        self.db
            .call(|conn| {
                let mut stmt = conn
                    .prepare("SELECT platform, connected FROM platform_links")
                    .map_err(|e| VaultError::Storage(format!("sqlite prepare failed: {e}")))?;

                let links = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)))
                    .map_err(|e| VaultError::Storage(format!("sqlite query failed: {e}")))?
                    .collect::<Result<HashMap<_, _>, _>>()
                    .map_err(|e| VaultError::Storage(format!("sqlite collect failed: {e}")))?;
                Ok(links)
            })
            .await
    }
}
