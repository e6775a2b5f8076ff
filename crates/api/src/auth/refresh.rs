//! Opaque refresh tokens. The plaintext goes to the client once; only
//! the SHA-256 hash is stored, and tokens rotate on every use.

use rand::{distr::Alphanumeric, Rng};

use glow_core::api_keys::sha256_hex;

pub const REFRESH_TOKEN_LENGTH: usize = 64;

pub fn generate_refresh_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token)
}
