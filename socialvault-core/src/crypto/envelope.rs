use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::aes_gcm::{aes256_gcm_decrypt, aes256_gcm_encrypt};
use super::pbkdf2::derive_key_default;
use crate::constants::{GCM_NONCE_LEN, GCM_TAG_LEN, PBKDF2_SALT_LEN};
use crate::error::{Result, VaultError};
use crate::traits::random::SecureRandom;

/// A sealed payload: base64 ciphertext (tag appended), IV and salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub data: String,
    pub iv: String,
    pub salt: String,
}

/// Seal `plaintext` under a key derived from `password`.
///
/// Salt and IV are drawn fresh from `rng` on every call, so two payloads never
/// share them even under the same password.
pub fn encrypt(plaintext: &[u8], password: &str, rng: &dyn SecureRandom) -> Result<EncryptedPayload> {
    let mut salt = [0u8; PBKDF2_SALT_LEN];
    let mut iv = [0u8; GCM_NONCE_LEN];
    rng.fill_bytes(&mut salt)
        .map_err(|e| VaultError::Encryption(format!("salt generation failed: {e}")))?;
    rng.fill_bytes(&mut iv)
        .map_err(|e| VaultError::Encryption(format!("IV generation failed: {e}")))?;

    let key = derive_key_default(password.as_bytes(), &salt)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;
    let ciphertext = aes256_gcm_encrypt(&key[..], &iv, plaintext)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    Ok(EncryptedPayload {
        data: BASE64_STANDARD.encode(ciphertext),
        iv: BASE64_STANDARD.encode(iv),
        salt: BASE64_STANDARD.encode(salt),
    })
}

/// Open a payload sealed by [`encrypt`].
///
/// Every failure (malformed encoding, wrong lengths, wrong password, tampered
/// bytes) is reported as `VaultError::Decryption`.
pub fn decrypt(payload: &EncryptedPayload, password: &str) -> Result<Vec<u8>> {
    let salt = decode_field("salt", &payload.salt)?;
    let iv = decode_field("iv", &payload.iv)?;
    let ciphertext = decode_field("data", &payload.data)?;

    if salt.len() != PBKDF2_SALT_LEN {
        return Err(VaultError::Decryption(format!(
            "salt must be {PBKDF2_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    if iv.len() != GCM_NONCE_LEN {
        return Err(VaultError::Decryption(format!(
            "iv must be {GCM_NONCE_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if ciphertext.len() < GCM_TAG_LEN {
        return Err(VaultError::Decryption("ciphertext shorter than auth tag".to_string()));
    }

    let key = derive_key_default(password.as_bytes(), &salt)
        .map_err(|e| VaultError::Decryption(e.to_string()))?;
    aes256_gcm_decrypt(&key[..], &iv, &ciphertext)
        .map_err(|_| VaultError::Decryption("authentication failed".to_string()))
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|e| VaultError::Decryption(format!("invalid base64 in {name}: {e}")))
}
