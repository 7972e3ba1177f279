//! Error types for `profiles-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("an account with email {0:?} already exists")]
  DuplicateEmail(String),

  /// Says nothing about which credential was wrong.
  #[error("unable to log in with provided credentials")]
  InvalidCredentials,

  #[error("account {actor} may not modify a record owned by {owner}")]
  Forbidden { actor: Uuid, owner: Uuid },

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("feed item not found: {0}")]
  FeedItemNotFound(Uuid),

  #[error("password hashing failed: {0}")]
  Hashing(String),
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so callers can recover the domain
/// failure behind an error without knowing which backend produced it.
pub trait AsCoreError {
  /// The domain error this error wraps, if any. Infrastructure failures
  /// (I/O, decoding) return `None`.
  fn as_core(&self) -> Option<&Error>;
}

impl AsCoreError for Error {
  fn as_core(&self) -> Option<&Error> { Some(self) }
}
