use crate::error::VaultError;

pub trait Clock {
    fn now_millis(&self) -> Result<u64, VaultError>;
}
