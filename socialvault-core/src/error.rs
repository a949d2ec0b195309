use std::time::Duration;

use thiserror::Error;

use crate::backup::step::StepId;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Not available: {0}")]
    NotAvailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid transition for step {step}: {from} -> {to}")]
    InvalidTransition {
        step: StepId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Backup cancelled")]
    Cancelled,

    #[error("Step {step} timed out after {limit:?}")]
    Timeout { step: StepId, limit: Duration },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
