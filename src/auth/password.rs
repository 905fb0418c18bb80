use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

/// Longest plaintext accepted for hashing, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password exceeds {} bytes", MAX_PASSWORD_BYTES)]
    TooLong,
    #[error("password hashing failed: {0}")]
    Internal(String),
}

/// Returned for every failed verification, whatever the cause.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("password does not match")]
pub struct PasswordMismatch;

/// Hashes `plain` with Argon2id and a fresh random salt (PHC string output).
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(HashError::TooLong);
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            HashError::Internal(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against a stored PHC hash.
///
/// A malformed stored hash is logged but reported exactly like a wrong password.
pub fn verify_password(hash: &str, plain: &str) -> Result<(), PasswordMismatch> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        warn!(error = %e, "stored password hash is malformed");
        PasswordMismatch
    })?;
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .map_err(|_| PasswordMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(&hash, password).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert_eq!(verify_password(&hash, "wrong-password"), Err(PasswordMismatch));
    }

    #[test]
    fn malformed_hash_is_a_plain_mismatch() {
        assert_eq!(verify_password("not-a-valid-hash", "anything"), Err(PasswordMismatch));
    }

    #[test]
    fn same_input_hashes_differently() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "secret123").is_ok());
        assert!(verify_password(&b, "secret123").is_ok());
    }

    #[test]
    fn rejects_oversized_input() {
        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        assert!(hash_password(&at_limit).is_ok());

        let over = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hash_password(&over), Err(HashError::TooLong)));
    }

    #[test]
    fn limit_counts_bytes_not_chars() {
        // 37 two-byte characters
        let wide = "é".repeat(37);
        assert!(matches!(hash_password(&wide), Err(HashError::TooLong)));
    }
}
