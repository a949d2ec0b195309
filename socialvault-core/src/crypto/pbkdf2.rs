use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{CryptoError, Result};
use crate::constants::{PAYLOAD_KEY_LEN, PBKDF2_ITERATIONS, PBKDF2_SALT_LEN};

/// Derive a 32-byte payload key from a password and salt using PBKDF2-HMAC-SHA256.
///
/// The key is wiped from memory when the returned value is dropped.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; PAYLOAD_KEY_LEN]>> {
    if salt.len() < PBKDF2_SALT_LEN {
        return Err(CryptoError::Pbkdf2Derive(format!(
            "salt too short: expected at least {PBKDF2_SALT_LEN}, got {}",
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(CryptoError::Pbkdf2Derive("iteration count must be non-zero".to_string()));
    }

    let mut output = Zeroizing::new([0u8; PAYLOAD_KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut output[..])
        .map_err(|e| CryptoError::Pbkdf2Derive(e.to_string()))?;

    Ok(output)
}

/// Derive a payload key with the default iteration count.
pub fn derive_key_default(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; PAYLOAD_KEY_LEN]>> {
    derive_key(password, salt, PBKDF2_ITERATIONS)
}
