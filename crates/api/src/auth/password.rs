//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so parameters and salt travel with them.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject passwords shorter than `min_length` characters or made only of
/// whitespace.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("ສະບາຍດີ-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("ສະບາຍດີ-password", &hash).unwrap());
        assert!(!verify_password("other-password", &hash).unwrap());
    }

    #[test]
    fn unreadable_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Eight Lao characters, 24 bytes.
        assert!(validate_password_strength("ກຂຄງຈສຊຍ", 8).is_ok());
        assert!(validate_password_strength("ກຂຄ", 8).is_err());
    }

    #[test]
    fn blank_password_is_rejected() {
        let msg = validate_password_strength("          ", 8).unwrap_err();
        assert!(msg.contains("blank"));
    }
}
