//! Password hashing with Argon2

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;

/// Upper bound on accepted secrets; Argon2 cost grows with input length
pub const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// A valid Argon2 hash whose password nobody knows
pub fn generate_impossible_hash() -> Result<String, PasswordError> {
    let random_password = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    hash_password(&random_password)
}

/// Burn one Argon2 verification so a lookup miss costs the same as a
/// wrong password.
pub fn verify_against_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| generate_impossible_hash().ok());
    if let Some(hash) = dummy {
        // timing only
        let _ = verify_password(password, hash);
    }
}

/// Validate the shape of a new password
pub fn validate_password(password: &str) -> Result<(), PasswordValidationError> {
    if password.is_empty() {
        return Err(PasswordValidationError::Empty);
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(PasswordValidationError::TooLong);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordValidationError {
    #[error("Password must not be empty")]
    Empty,
    #[error("Password must be at most 128 characters long")]
    TooLong,
}
