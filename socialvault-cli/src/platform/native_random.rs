use socialvault_core::error::VaultError;
use socialvault_core::traits::random::SecureRandom;

/// SecureRandom backed by the OS CSPRNG via getrandom.
pub struct NativeRandom;

impl NativeRandom {
    pub fn new() -> Self {
        Self
    }
}

impl SecureRandom for NativeRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        getrandom::getrandom(dest)
            .map_err(|e| VaultError::Platform(format!("getrandom failed: {e}")))
    }
}
