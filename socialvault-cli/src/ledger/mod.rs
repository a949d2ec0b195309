//! Native ledger adapter.

pub mod journal;

pub use journal::JournalLedger;
