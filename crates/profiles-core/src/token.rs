//! Bearer tokens issued at login.
//!
//! The key handed to the client is 20 random bytes, hex encoded. Stores keep
//! only its SHA-256 digest, so a leaked database does not leak live tokens.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const KEY_BYTES: usize = 20;

/// A freshly issued token. `key` is only ever available at issue time.
#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub key:        String,
  pub account_id: Uuid,
  pub created:    DateTime<Utc>,
}

/// Generate a new random token key.
pub fn generate_key() -> String {
  let mut bytes = [0u8; KEY_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest stored in place of `key`.
pub fn digest_key(key: &str) -> String {
  hex::encode(Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_are_forty_hex_chars_and_unique() {
    let a = generate_key();
    let b = generate_key();
    assert_eq!(a.len(), 40);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }

  #[test]
  fn digest_is_stable_and_hides_key() {
    let key = generate_key();
    assert_eq!(digest_key(&key), digest_key(&key));
    assert_ne!(digest_key(&key), key);
    assert_eq!(digest_key(&key).len(), 64);
  }
}
