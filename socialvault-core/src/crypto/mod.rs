//! Password-based payload encryption: PBKDF2-HMAC-SHA256 key derivation and
//! AES-256-GCM sealing of backup archives.

pub mod aes_gcm;
pub mod pbkdf2;
pub mod envelope;
pub mod password;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("AES-GCM encryption failed: {0}")]
    AesGcmEncrypt(String),
    #[error("AES-GCM decryption failed: {0}")]
    AesGcmDecrypt(String),
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("PBKDF2 derivation failed: {0}")]
    Pbkdf2Derive(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
