//! Platform-independent core of the SocialVault backup pipeline.
//!
//! The encryption helper, the storage/ledger/source capabilities and the
//! five-step backup workflow live here so the CLI only has to wire adapters
//! together.

pub mod error;
pub mod constants;
pub mod traits;
pub mod crypto;
pub mod archive;
pub mod backup;
pub mod simulated;
pub mod history;
pub mod platform;

#[cfg(test)]
mod test_support;
