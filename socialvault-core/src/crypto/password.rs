use std::fmt;

use zeroize::Zeroizing;

use crate::constants::PASSPHRASE_ALPHABET;
use crate::error::{Result, VaultError};
use crate::traits::random::SecureRandom;

/// A secret passphrase, wiped from memory on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Generate a random passphrase sampled uniformly from [`PASSPHRASE_ALPHABET`].
///
/// Bytes that would bias the distribution (>= the largest multiple of the
/// alphabet size below 256) are rejected and redrawn.
pub fn generate_random_password(length: usize, rng: &dyn SecureRandom) -> Result<Passphrase> {
    let alphabet_len = PASSPHRASE_ALPHABET.len();
    let limit = 256 - (256 % alphabet_len);

    let mut out = Zeroizing::new(String::with_capacity(length));
    let mut buf = Zeroizing::new([0u8; 64]);

    while out.len() < length {
        rng.fill_bytes(&mut buf[..])
            .map_err(|e| VaultError::Encryption(format!("passphrase generation failed: {e}")))?;
        for &byte in buf.iter() {
            if out.len() == length {
                break;
            }
            if (byte as usize) < limit {
                out.push(PASSPHRASE_ALPHABET[byte as usize % alphabet_len] as char);
            }
        }
    }

    Ok(Passphrase(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_PASSPHRASE_LEN;
    use crate::test_support::{FailingRng, SequenceRng, TestRng};

    #[test]
    fn test_length_and_alphabet() {
        let pw = generate_random_password(DEFAULT_PASSPHRASE_LEN, &TestRng).unwrap();
        assert_eq!(pw.len(), DEFAULT_PASSPHRASE_LEN);
        assert!(pw.expose().bytes().all(|b| PASSPHRASE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_zero_length() {
        let pw = generate_random_password(0, &TestRng).unwrap();
        assert!(pw.is_empty());
    }

    #[test]
    fn test_biased_bytes_rejected() {
        // 70 symbols: bytes 210..=255 must be skipped, 0 maps to 'A', 69 to '*'.
        let rng = SequenceRng::from_bytes(vec![255, 210, 0, 69, 70]);
        let pw = generate_random_password(3, &rng).unwrap();
        assert_eq!(pw.expose(), "A*A");
    }

    #[test]
    fn test_two_passphrases_differ() {
        let a = generate_random_password(32, &TestRng).unwrap();
        let b = generate_random_password(32, &TestRng).unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn test_debug_is_redacted() {
        let pw = Passphrase::new("topsecret");
        assert!(!format!("{pw:?}").contains("topsecret"));
    }

    #[test]
    fn test_rng_failure() {
        assert!(generate_random_password(8, &FailingRng).is_err());
    }
}
