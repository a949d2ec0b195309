use crate::error::VaultError;

pub trait SecureRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), VaultError>;
}

