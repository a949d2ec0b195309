use std::time::SystemTime;

use socialvault_core::error::VaultError;
use socialvault_core::traits::clock::Clock;

/// Wall clock backed by `SystemTime`.
pub struct NativeClock;

impl NativeClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for NativeClock {
    fn now_millis(&self) -> Result<u64, VaultError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| VaultError::Platform(format!("SystemTime error: {e}")))
    }
}
