//! Stand-ins for the external services: a content store that hands out
//! CIDv0-looking identifiers, a ledger that confirms after a delay and a
//! platform source that fabricates posts. Delays are configurable so tests
//! can run them instantly.

pub mod delay;
pub mod store;
pub mod ledger;
pub mod source;

pub use delay::SimulatedDelay;
pub use ledger::SimulatedLedger;
pub use source::SyntheticSource;
pub use store::SimulatedContentStore;
