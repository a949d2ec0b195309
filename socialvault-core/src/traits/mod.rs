//! Capability traits the backup workflow consumes. Adapters are chosen at the
//! composition root: simulated ones live in `crate::simulated`, native ones in
//! the CLI.

pub mod source;
pub mod storage;
pub mod ledger;
pub mod random;
pub mod clock;
