//! One-way hashing for account secrets.
//!
//! Secrets are stored as argon2id PHC strings (`$argon2id$v=19$…`); the
//! plaintext never reaches the database.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash `secret` with a fresh random salt.
pub fn hash_secret(secret: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(secret.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hashing(e.to_string()))
}

/// Check `secret` against a stored PHC string. A malformed stored hash never
/// verifies.
pub fn verify_secret(secret: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_round_trips() {
    let hash = hash_secret("pw123456").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_secret("pw123456", &hash));
    assert!(!verify_secret("pw1234567", &hash));
  }

  #[test]
  fn hashes_are_salted() {
    let a = hash_secret("same").unwrap();
    let b = hash_secret("same").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_secret("anything", "not-a-phc-string"));
    assert!(!verify_secret("", ""));
  }
}
