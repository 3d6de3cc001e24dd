use rand::distr::Alphanumeric;
use rand::RngExt;
use sha2::{Digest, Sha256};

const TOKEN_LENGTH: usize = 64;

/// One-time token handed to the user (reset links, email confirmation).
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Only the digest of a one-time token is persisted.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}
