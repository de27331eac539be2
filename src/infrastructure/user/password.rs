//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt::Debug;

use crate::domain::PasswordError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check a candidate password against a stored hash
    fn verify(&self, hash: &str, password: &str) -> Result<(), PasswordError>;
}

/// Argon2-based password hasher with the algorithm's default cost parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self
    }
}

/// Surrounding whitespace is not part of a password
fn sanitize(password: &str) -> Result<&str, PasswordError> {
    let trimmed = password.trim();

    if trimmed.is_empty() {
        return Err(PasswordError::EmptyInput);
    }

    Ok(trimmed)
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = sanitize(password)?;
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, hash: &str, password: &str) -> Result<(), PasswordError> {
        let password = sanitize(password)?;

        // An unparseable stored hash can never match
        let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::Mismatch)?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| PasswordError::Mismatch)
    }
}
