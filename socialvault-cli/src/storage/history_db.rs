use std::path::Path;

use tracing::debug;

use socialvault_core::error::VaultError;
use socialvault_core::history::HistoryEntry;

use super::sqlite::SqliteDb;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS history (
    id          TEXT PRIMARY KEY,
    content_id  TEXT NOT NULL,
    tx_id       TEXT NOT NULL,
    timestamp   INTEGER NOT NULL,
    platform    TEXT NOT NULL,
    encrypted   INTEGER NOT NULL,
    size        INTEGER NOT NULL,
    description TEXT
);";

/// Backup history persisted in SQLite.
pub struct SqliteHistory {
    db: SqliteDb,
}

impl SqliteHistory {
    pub fn open(db_path: &Path) -> Result<Self, VaultError> {
        Ok(Self {
            db: SqliteDb::open(db_path, SCHEMA)?,
        })
    }

    pub async fn append(&self, entry: &HistoryEntry) -> Result<(), VaultError> {
        let entry = entry.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO history
                        (id, content_id, tx_id, timestamp, platform, encrypted, size, description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        entry.id,
                        entry.content_id,
                        entry.tx_id,
                        entry.timestamp as i64,
                        entry.platform,
                        entry.encrypted,
                        entry.size as i64,
                        entry.description,
                    ],
                )
                .map_err(|e| VaultError::Storage(format!("insert history entry failed: {e}")))?;

                debug!("Appended history entry {} ({})", entry.id, entry.content_id);
                Ok(())
            })
            .await
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, VaultError> {
        self.db
            .call(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, content_id, tx_id, timestamp, platform, encrypted, size, description
                         FROM history ORDER BY timestamp DESC, id DESC",
                    )
                    .map_err(|e| VaultError::Storage(format!("sqlite prepare failed: {e}")))?;

                let entries = stmt
                    .query_map([], |row| {
                        Ok(HistoryEntry {
                            id: row.get(0)?,
                            content_id: row.get(1)?,
                            tx_id: row.get(2)?,
                            timestamp: row.get::<_, i64>(3)? as u64,
                            platform: row.get(4)?,
                            encrypted: row.get(5)?,
                            size: row.get::<_, i64>(6)? as u64,
                            description: row.get(7)?,
                        })
                    })
                    .map_err(|e| VaultError::Storage(format!("sqlite query failed: {e}")))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| VaultError::Storage(format!("sqlite collect failed: {e}")))?;

                debug!("Listed {} history entries", entries.len());
                Ok(entries)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, timestamp: u64, platform: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            content_id: format!("cid-{id}"),
            tx_id: format!("0x{id}"),
            timestamp,
            platform: platform.to_string(),
            encrypted: id.len() % 2 == 0,
            size: 1024 * timestamp,
            description: Some(format!("{platform} backup")),
        }
    }

    #[tokio::test]
    async fn test_append_and_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = SqliteHistory::open(&dir.path().join("vault.db")).unwrap();

        history.append(&entry("a", 1, "twitter")).await.unwrap();
        history.append(&entry("bb", 3, "instagram")).await.unwrap();
        history.append(&entry("c", 2, "twitter")).await.unwrap();

        let listed = history.list().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bb", "c", "a"]);
        assert_eq!(listed[0], entry("bb", 3, "instagram"));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let history = SqliteHistory::open(&dir.path().join("vault.db")).unwrap();
        history.append(&entry("a", 1, "twitter")).await.unwrap();
        assert!(history.append(&entry("a", 2, "twitter")).await.is_err());
    }

    #[tokio::test]
    async fn test_reopen_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        {
            let history = SqliteHistory::open(&path).unwrap();
            history.append(&entry("a", 1, "twitter")).await.unwrap();
        }
        let history = SqliteHistory::open(&path).unwrap();
        assert_eq!(history.list().await.unwrap().len(), 1);
    }
}
