use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must contain at least one letter and one digit")]
    TooWeak,
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

pub struct PasswordService;

impl PasswordService {
    pub fn validate_strength(password: &str) -> Result<(), PasswordError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        let has_letter = password.chars().any(|c| c.is_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            return Err(PasswordError::TooWeak);
        }
        Ok(())
    }

    pub fn hash_password(password: &str) -> Result<String, PasswordError> {
        Self::hash_with_cost(password, DEFAULT_COST)
    }

    fn hash_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
        hash(password, cost).map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }
}
