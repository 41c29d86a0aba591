//! Client-portal bearer keys.
//!
//! Keys look like `cp_live_<random>` and are shown once when an approver
//! contact is created; only an argon2 hash and a lookup prefix are stored.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::distr::{Alphanumeric, SampleString};

use adflow_core::constants::PORTAL_KEY_PREFIX;
use adflow_core::AppError;

const KEY_RANDOM_LEN: usize = 32;
const KEY_PREFIX_LEN: usize = 16;

/// Generate a new portal key. The caller is responsible for showing it to
/// the user exactly once and persisting only the hash.
pub fn generate_portal_key() -> String {
    let random = Alphanumeric.sample_string(&mut rand::rng(), KEY_RANDOM_LEN);
    format!("{}{}", PORTAL_KEY_PREFIX, random)
}

pub fn hash_portal_key(key: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash portal key: {}", e)))
}

pub fn verify_portal_key(key: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid hash format: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(key.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Extract the key prefix (first 16 chars) for identification.
pub fn extract_key_prefix(key: &str) -> String {
    if key.len() > KEY_PREFIX_LEN {
        key[..KEY_PREFIX_LEN].to_string()
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_has_prefix() {
        let key = generate_portal_key();
        assert!(key.starts_with(PORTAL_KEY_PREFIX));
        assert_eq!(key.len(), PORTAL_KEY_PREFIX.len() + KEY_RANDOM_LEN);
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let key = generate_portal_key();
        let hash = hash_portal_key(&key).expect("hash");
        assert!(verify_portal_key(&key, &hash).expect("verify"));
        assert!(!verify_portal_key("cp_live_wrong", &hash).expect("verify"));
    }

    #[test]
    fn test_prefix_extraction() {
        let key = generate_portal_key();
        let prefix = extract_key_prefix(&key);
        assert_eq!(prefix.len(), KEY_PREFIX_LEN);
        assert!(key.starts_with(&prefix));
        assert_eq!(extract_key_prefix("short"), "short");
    }
}
