/// PBKDF2 iterations for payload key derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// PBKDF2 salt length in bytes, generated fresh for every payload.
pub const PBKDF2_SALT_LEN: usize = 16;

/// AES-256-GCM key length in bytes.
pub const PAYLOAD_KEY_LEN: usize = 32;

/// AES-GCM nonce (IV) length in bytes.
pub const GCM_NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const GCM_TAG_LEN: usize = 16;

/// Alphabet sampled by the throwaway passphrase generator.
pub const PASSPHRASE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Default length of a generated passphrase.
pub const DEFAULT_PASSPHRASE_LEN: usize = 32;

/// Prefix of simulated content identifiers (CIDv0 look-alike).
pub const SIMULATED_CID_PREFIX: &str = "Qm";

/// Number of random characters after the simulated CID prefix.
pub const SIMULATED_CID_BODY_LEN: usize = 44;

/// Public gateway used to build shareable links for simulated content ids.
pub const GATEWAY_BASE_URL: &str = "https://ipfs.io/ipfs/";

/// Number of posts the synthetic platform source fabricates.
pub const SYNTHETIC_POST_COUNT: usize = 50;

/// One day in milliseconds.
pub const DAY_MILLIS: u64 = 86_400_000;

/// Message recorded on steps still running when a run aborts.
pub const INTERRUPTED_MESSAGE: &str = "Process interrupted";
