use async_trait::async_trait;

use crate::error::VaultError;

pub type TxId = String;

/// Append-only record of content references, bound to a signing identity.
///
/// Writes are submit-then-confirm: `register` and `record` resolve only once
/// the transaction is confirmed. A missing signing identity surfaces as
/// `VaultError::NotAvailable` from `initialize`; every other failure is
/// `VaultError::Ledger`.
#[async_trait(?Send)]
pub trait Ledger {
    async fn initialize(&self) -> Result<(), VaultError>;
    async fn register(&self) -> Result<TxId, VaultError>;
    async fn record(
        &self,
        content_id: &str,
        platform: &str,
        encrypted: bool,
    ) -> Result<TxId, VaultError>;
    async fn is_registered(&self, address: &str) -> Result<bool, VaultError>;
    async fn entry_count(&self, address: &str) -> Result<u64, VaultError>;
}
