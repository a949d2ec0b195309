use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::{CryptoError, Result};
use crate::constants::{GCM_NONCE_LEN, PAYLOAD_KEY_LEN};

fn check_lengths(key: &[u8], nonce: &[u8]) -> Result<()> {
    if key.len() != PAYLOAD_KEY_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: PAYLOAD_KEY_LEN,
            got: key.len(),
        });
    }
    if nonce.len() != GCM_NONCE_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: GCM_NONCE_LEN,
            got: nonce.len(),
        });
    }
    Ok(())
}

/// Encrypt with AES-256-GCM, returning ciphertext with appended 16-byte auth tag.
pub fn aes256_gcm_encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, nonce)?;

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::AesGcmEncrypt(e.to_string()))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::AesGcmEncrypt(e.to_string()))
}

/// Decrypt AES-256-GCM ciphertext, verifying the auth tag.
pub fn aes256_gcm_decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, nonce)?;

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::AesGcmDecrypt(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::AesGcmDecrypt(e.to_string()))
}
