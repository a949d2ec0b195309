use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, info};

use super::delay::SimulatedDelay;
use crate::error::VaultError;
use crate::traits::ledger::{Ledger, TxId};

/// Ledger that "confirms" transactions after a delay, keeping its state in
/// memory.
pub struct SimulatedLedger {
    signer: Option<String>,
    submit_delay: SimulatedDelay,
    confirm_delay: SimulatedDelay,
    fail_confirmations: bool,
    initialized: Cell<bool>,
    registered: RefCell<HashSet<String>>,
    entries: RefCell<HashMap<String, u64>>,
}

impl SimulatedLedger {
    /// `signer` is the wallet address transactions are sent from; without one
    /// `initialize` fails with `NotAvailable`.
    pub fn new(signer: Option<String>, submit_delay: SimulatedDelay, confirm_delay: SimulatedDelay) -> Self {
        Self {
            signer,
            submit_delay,
            confirm_delay,
            fail_confirmations: false,
            initialized: Cell::new(false),
            registered: RefCell::new(HashSet::new()),
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn instant(signer: Option<String>) -> Self {
        Self::new(signer, SimulatedDelay::None, SimulatedDelay::None)
    }

    /// Make every `record` fail at confirmation.
    pub fn failing_records(mut self) -> Self {
        self.fail_confirmations = true;
        self
    }

    fn signer(&self) -> Result<&str, VaultError> {
        if !self.initialized.get() {
            return Err(VaultError::Ledger("ledger not initialized".to_string()));
        }
        self.signer
            .as_deref()
            .ok_or_else(|| VaultError::NotAvailable("no signing identity".to_string()))
    }

    /// Submit and wait for confirmation; returns the transaction hash.
    async fn submit(&self, what: &str) -> Result<TxId, VaultError> {
        self.submit_delay.wait(0).await;
        let tx_id = format!("0x{}", hex::encode(rand::random::<[u8; 32]>()));
        debug!("Submitted {} as {}", what, tx_id);

        self.confirm_delay.wait(0).await;
        if self.fail_confirmations && what == "record" {
            return Err(VaultError::Ledger(format!(
                "transaction {tx_id} failed to confirm"
            )));
        }
        Ok(tx_id)
    }
}

#[async_trait(?Send)]
impl Ledger for SimulatedLedger {
    async fn initialize(&self) -> Result<(), VaultError> {
        match &self.signer {
            Some(address) => {
                self.initialized.set(true);
                info!("Ledger initialized for {}", address);
                Ok(())
            }
            None => Err(VaultError::NotAvailable(
                "no wallet connected; a signing identity is required".to_string(),
            )),
        }
    }

    async fn register(&self) -> Result<TxId, VaultError> {
        let signer = self.signer()?.to_string();
        let tx_id = self.submit("register").await?;
        self.registered.borrow_mut().insert(signer);
        Ok(tx_id)
    }

    async fn record(
        &self,
        content_id: &str,
        platform: &str,
        encrypted: bool,
    ) -> Result<TxId, VaultError> {
        let signer = self.signer()?.to_string();
        if content_id.is_empty() {
            return Err(VaultError::Ledger("content id must not be empty".to_string()));
        }

        let tx_id = self.submit("record").await?;
        *self.entries.borrow_mut().entry(signer).or_insert(0) += 1;
        info!(
            "Recorded {} for {} (encrypted: {}) in {}",
            content_id, platform, encrypted, tx_id
        );
        Ok(tx_id)
    }

    async fn is_registered(&self, address: &str) -> Result<bool, VaultError> {
        self.signer()?;
        Ok(self.registered.borrow().contains(address))
    }

    async fn entry_count(&self, address: &str) -> Result<u64, VaultError> {
        self.signer()?;
        Ok(self.entries.borrow().get(address).copied().unwrap_or(0))
    }
}
