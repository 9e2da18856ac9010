//! Password hashing
//!
//! Passwords are stored as Argon2id PHC strings with a random per-hash salt.
//! The plaintext never leaves this module in any other form.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{Error, Result};

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::PasswordHash(err.to_string()))
}

/// Compare a candidate against a stored hash.
///
/// Returns `false` for any mismatch, including an unparseable stored hash.
pub fn compare_password(candidate: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "Stored password hash could not be parsed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}
