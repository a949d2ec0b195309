//! Native platform implementations (clock, random) for the core traits.

pub mod native_clock;
pub mod native_random;

pub use native_clock::NativeClock;
pub use native_random::NativeRandom;
