use std::cell::Cell;
use std::path::Path;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use socialvault_core::error::VaultError;
use socialvault_core::traits::ledger::{Ledger, TxId};

use crate::storage::SqliteDb;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS registrations (
    address TEXT PRIMARY KEY,
    tx_id   TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS entries (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    address    TEXT NOT NULL,
    content_id TEXT NOT NULL,
    platform   TEXT NOT NULL,
    encrypted  INTEGER NOT NULL,
    tx_id      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_address ON entries(address);";

/// Append-only ledger kept as a local SQLite journal.
///
/// A write is "submitted" by inserting it inside a transaction and
/// "confirmed" when that transaction commits. Transaction ids are
/// `0x` + hex SHA-256 over the row's fields and its sequence number.
pub struct JournalLedger {
    db: SqliteDb,
    signer: Option<String>,
    initialized: Cell<bool>,
}

impl JournalLedger {
    pub fn open(db_path: &Path, signer: Option<String>) -> Result<Self, VaultError> {
        let db = SqliteDb::open(db_path, SCHEMA)
            .map_err(|e| VaultError::Ledger(format!("open journal failed: {e}")))?;
        Ok(Self {
            db,
            signer,
            initialized: Cell::new(false),
        })
    }

    fn signer(&self) -> Result<String, VaultError> {
        if !self.initialized.get() {
            return Err(VaultError::Ledger("ledger not initialized".to_string()));
        }
        self.signer
            .clone()
            .ok_or_else(|| VaultError::NotAvailable("no signing identity".to_string()))
    }
}

fn tx_hash(fields: &[&str], seq: i64) -> TxId {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(seq.to_be_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn ledger_err(context: &str) -> impl FnOnce(rusqlite::Error) -> VaultError + '_ {
    move |e| VaultError::Ledger(format!("{context}: {e}"))
}

#[async_trait(?Send)]
impl Ledger for JournalLedger {
    async fn initialize(&self) -> Result<(), VaultError> {
        match &self.signer {
            Some(address) => {
                self.initialized.set(true);
                info!("Journal ledger initialized for {}", address);
                Ok(())
            }
            None => Err(VaultError::NotAvailable(
                "no wallet configured; set SOCIALVAULT_WALLET".to_string(),
            )),
        }
    }

    async fn register(&self) -> Result<TxId, VaultError> {
        let address = self.signer()?;
        self.db
            .call(move |conn| {
                let tx = conn.transaction().map_err(ledger_err("begin failed"))?;

                let existing: Option<String> = tx
                    .query_row(
                        "SELECT tx_id FROM registrations WHERE address = ?1",
                        rusqlite::params![address],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(ledger_err("lookup registration failed"))?;
                if let Some(prior) = existing {
                    return Err(VaultError::Ledger(format!(
                        "{address} is already registered ({prior})"
                    )));
                }

                let tx_id = tx_hash(&["register", address.as_str()], 0);
                tx.execute(
                    "INSERT INTO registrations (address, tx_id) VALUES (?1, ?2)",
                    rusqlite::params![address, tx_id],
                )
                .map_err(ledger_err("insert registration failed"))?;
                tx.commit().map_err(ledger_err("commit failed"))?;

                info!("Registered {} in {}", address, tx_id);
                Ok(tx_id)
            })
            .await
    }

    async fn record(
        &self,
        content_id: &str,
        platform: &str,
        encrypted: bool,
    ) -> Result<TxId, VaultError> {
        let address = self.signer()?;
        if content_id.is_empty() {
            return Err(VaultError::Ledger("content id must not be empty".to_string()));
        }
        let content_id = content_id.to_string();
        let platform = platform.to_string();

        self.db
            .call(move |conn| {
                let tx = conn.transaction().map_err(ledger_err("begin failed"))?;

                tx.execute(
                    "INSERT INTO entries (address, content_id, platform, encrypted, tx_id)
                     VALUES (?1, ?2, ?3, ?4, '')",
                    rusqlite::params![address, content_id, platform, encrypted],
                )
                .map_err(ledger_err("insert entry failed"))?;
                let seq = tx.last_insert_rowid();

                let flag = if encrypted { "1" } else { "0" };
                let fields = [address.as_str(), content_id.as_str(), platform.as_str(), flag];
                let tx_id = tx_hash(&fields, seq);
                tx.execute(
                    "UPDATE entries SET tx_id = ?1 WHERE seq = ?2",
                    rusqlite::params![tx_id, seq],
                )
                .map_err(ledger_err("stamp entry failed"))?;
                tx.commit().map_err(ledger_err("commit failed"))?;

                info!(
                    "Recorded {} for {} (encrypted: {}) in {}",
                    content_id, platform, encrypted, tx_id
                );
                Ok(tx_id)
            })
            .await
    }

    async fn is_registered(&self, address: &str) -> Result<bool, VaultError> {
        self.signer()?;
        let address = address.to_string();
        self.db
            .call(move |conn| {
                let count: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM registrations WHERE address = ?1",
                        rusqlite::params![address],
                        |row| row.get(0),
                    )
                    .map_err(ledger_err("query registration failed"))?;
                debug!("Registration lookup for {}: {}", address, count > 0);
                Ok(count > 0)
            })
            .await
    }

    async fn entry_count(&self, address: &str) -> Result<u64, VaultError> {
        self.signer()?;
        let address = address.to_string();
        self.db
            .call(move |conn| {
                let count: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM entries WHERE address = ?1",
                        rusqlite::params![address],
                        |row| row.get(0),
                    )
                    .map_err(ledger_err("count entries failed"))?;
                Ok(count as u64)
            })
            .await
    }
}
