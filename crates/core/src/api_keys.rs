//! Consumer API key generation and hashing (PRD-09).
//!
//! Keys are issued per profile for the companion app. Only the SHA-256
//! hash is stored; the plaintext is shown once at creation time. The
//! prefix is kept alongside the hash so admins can tell keys apart.

use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Length of a generated key in characters.
pub const API_KEY_LENGTH: usize = 48;

/// Length of the stored display prefix.
pub const API_KEY_PREFIX_LENGTH: usize = 8;

/// A freshly generated API key. `plaintext` must be returned to the
/// caller immediately and never persisted.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    pub plaintext: String,
    pub prefix: String,
    pub hash: String,
}

/// Generate a random alphanumeric API key with its stored fields.
pub fn generate_api_key() -> GeneratedApiKey {
    let plaintext: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect();
    let prefix = plaintext[..API_KEY_PREFIX_LENGTH].to_string();
    let hash = hash_api_key(&plaintext);
    GeneratedApiKey {
        plaintext,
        prefix,
        hash,
    }
}

/// SHA-256 hex digest of a key, the form stored and compared at auth time.
pub fn hash_api_key(key: &str) -> String {
    sha256_hex(key)
}

/// Hex-encoded SHA-256, also used for opaque refresh tokens.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
