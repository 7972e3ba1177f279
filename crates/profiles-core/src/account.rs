//! Accounts, the registered users of the service.
//!
//! An account is a plain record plus a handful of capability flags. Secret
//! handling lives in [`crate::secret`]; stores call it so that only hashes
//! are ever persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::validation::{MAX_NAME_LEN, ValidationErrors, normalize_email};

// ─── Account ─────────────────────────────────────────────────────────────────

/// A persisted account. The email is unique and already normalised.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
  pub id:            Uuid,
  pub email:         String,
  pub name:          String,
  /// argon2 PHC string; never serialised.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub is_active:     bool,
  pub is_staff:      bool,
  pub is_superuser:  bool,
  pub date_joined:   DateTime<Utc>,
}

impl Account {
  pub fn full_name(&self) -> &str { &self.name }

  pub fn short_name(&self) -> &str { &self.name }
}

impl fmt::Display for Account {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.email)
  }
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// Capability flags assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
  #[default]
  Regular,
  Superuser,
}

impl Role {
  pub fn is_staff(self) -> bool { matches!(self, Self::Superuser) }

  pub fn is_superuser(self) -> bool { matches!(self, Self::Superuser) }
}

// ─── NewAccount ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ProfileStore::create_account`]. `password` is the
/// plaintext secret; the store hashes it before anything is written.
#[derive(Clone)]
pub struct NewAccount {
  pub email:    String,
  pub name:     String,
  pub password: String,
}

impl NewAccount {
  pub fn new(
    email: impl Into<String>,
    name: impl Into<String>,
    password: impl Into<String>,
  ) -> Self {
    Self { email: email.into(), name: name.into(), password: password.into() }
  }

  /// Validate every field and return a copy with the email normalised and
  /// the name trimmed.
  pub fn prepare(self) -> Result<Self, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check_email("email", &self.email);
    let name = errors.clean_text("name", &self.name, MAX_NAME_LEN);
    check_password(&mut errors, &self.password);
    errors.finish(Self { email: normalize_email(&self.email), name, ..self })
  }
}

impl fmt::Debug for NewAccount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NewAccount")
      .field("email", &self.email)
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

// ─── AccountChanges ──────────────────────────────────────────────────────────

/// A self-service update. `None` leaves the field as it is.
#[derive(Clone, Default)]
pub struct AccountChanges {
  pub email:    Option<String>,
  pub name:     Option<String>,
  pub password: Option<String>,
}

impl AccountChanges {
  pub fn is_empty(&self) -> bool {
    self.email.is_none() && self.name.is_none() && self.password.is_none()
  }

  /// Validate the fields that are present and normalise the email.
  pub fn prepare(self) -> Result<Self, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(email) = &self.email {
      errors.check_email("email", email);
    }
    let name = self
      .name
      .as_deref()
      .map(|name| errors.clean_text("name", name, MAX_NAME_LEN));
    if let Some(password) = &self.password {
      check_password(&mut errors, password);
    }
    let email = self.email.as_deref().map(normalize_email);
    errors.finish(Self { email, name, ..self })
  }
}

impl fmt::Debug for AccountChanges {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AccountChanges")
      .field("email", &self.email)
      .field("name", &self.name)
      .field("password", &self.password.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

/// Whitespace-only counts as blank. The password itself is kept verbatim.
fn check_password(errors: &mut ValidationErrors, password: &str) {
  if password.trim().is_empty() {
    errors.add("password", crate::validation::BLANK);
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ProfileStore::list_accounts`]. All filters
/// combine with AND; an empty query lists every account.
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
  pub id:     Option<Uuid>,
  /// Exact match after normalisation.
  pub email:  Option<String>,
  /// Case-insensitive substring over name and email.
  pub search: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::{BLANK, INVALID_EMAIL};

  #[test]
  fn prepare_normalises_email() {
    let prepared = NewAccount::new(" a@X.COM", "A", "pw123456").prepare().unwrap();
    assert_eq!(prepared.email, "a@x.com");
    assert_eq!(prepared.name, "A");
  }

  #[test]
  fn empty_email_is_a_validation_error() {
    let errors = NewAccount::new("", "A", "pw").prepare().unwrap_err();
    assert_eq!(errors.field("email"), Some(&[BLANK.to_owned()][..]));
  }

  #[test]
  fn every_bad_field_is_reported() {
    let errors = NewAccount::new("nope", " ", "").prepare().unwrap_err();
    assert_eq!(errors.field("email"), Some(&[INVALID_EMAIL.to_owned()][..]));
    assert!(errors.field("name").is_some());
    assert!(errors.field("password").is_some());
  }

  #[test]
  fn name_is_trimmed() {
    let prepared = NewAccount::new("a@x.com", "  A  ", "pw123456").prepare().unwrap();
    assert_eq!(prepared.name, "A");

    let changes = AccountChanges { name: Some(" B ".into()), ..Default::default() };
    assert_eq!(changes.prepare().unwrap().name.as_deref(), Some("B"));
  }

  #[test]
  fn whitespace_password_is_blank() {
    let errors = NewAccount::new("a@x.com", "A", "   ").prepare().unwrap_err();
    assert_eq!(errors.field("password"), Some(&[BLANK.to_owned()][..]));

    let changes = AccountChanges { password: Some("\t ".into()), ..Default::default() };
    let errors = changes.prepare().unwrap_err();
    assert_eq!(errors.field("password"), Some(&[BLANK.to_owned()][..]));

    let kept = NewAccount::new("a@x.com", "A", " pw 123 ").prepare().unwrap();
    assert_eq!(kept.password, " pw 123 ");
  }

  #[test]
  fn changes_only_check_present_fields() {
    let changes = AccountChanges { name: Some("B".into()), ..Default::default() };
    assert!(changes.prepare().is_ok());

    let changes = AccountChanges { email: Some("B@EXAMPLE.org".into()), ..Default::default() };
    assert_eq!(changes.prepare().unwrap().email.as_deref(), Some("B@example.org"));
  }

  #[test]
  fn debug_output_hides_password() {
    let input = NewAccount::new("a@x.com", "A", "hunter22");
    assert!(!format!("{input:?}").contains("hunter22"));

    let changes = AccountChanges { password: Some("hunter22".into()), ..Default::default() };
    assert!(!format!("{changes:?}").contains("hunter22"));
  }

  #[test]
  fn serialised_account_omits_hash() {
    let account = Account {
      id:            Uuid::nil(),
      email:         "a@x.com".into(),
      name:          "A".into(),
      password_hash: "$argon2id$secret".into(),
      is_active:     true,
      is_staff:      false,
      is_superuser:  false,
      date_joined:   Utc::now(),
    };
    let json = serde_json::to_string(&account).unwrap();
    assert!(!json.contains("argon2"));
    assert!(!json.contains("password"));
    assert_eq!(account.to_string(), "a@x.com");
    assert_eq!(account.full_name(), "A");
    assert_eq!(account.short_name(), "A");
  }
}
