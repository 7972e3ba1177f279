//! Field-level validation shared by the stores and the HTTP serializers.
//!
//! Failures are collected per field so a client sees every problem with a
//! request at once, e.g. `{"email": ["This field may not be blank."]}`.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_STATUS_TEXT_LEN: usize = 255;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_STRING: &str = "Not a valid string.";

/// Key for messages that belong to the request as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub fn too_long(max: usize) -> String {
  format!("Ensure this field has no more than {max} characters.")
}

// ─── ValidationErrors ────────────────────────────────────────────────────────

/// Messages keyed by field name. Serialises as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  /// A single message against a single field.
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_owned()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn field(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  /// Record `REQUIRED` when a field was absent from the input.
  pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
      self.add(field, REQUIRED);
    }
    value
  }

  /// Trim `value`, then require non-blank text of at most `max` characters.
  /// Returns the trimmed text.
  pub fn clean_text(&mut self, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
      self.add(field, BLANK);
    } else if value.chars().count() > max {
      self.add(field, too_long(max));
    }
    value.to_owned()
  }

  /// A non-blank, well-formed email of at most [`MAX_EMAIL_LEN`] characters.
  pub fn check_email(&mut self, field: &str, value: &str) {
    if value.trim().is_empty() {
      self.add(field, BLANK);
      return;
    }
    if value.chars().count() > MAX_EMAIL_LEN {
      self.add(field, too_long(MAX_EMAIL_LEN));
    }
    if !looks_like_email(value) {
      self.add(field, INVALID_EMAIL);
    }
  }

  /// `Ok(value)` when nothing was recorded.
  pub fn finish<T>(self, value: T) -> Result<T, Self> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field}: {message}")?;
        first = false;
      }
    }
    Ok(())
  }
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// Trim surrounding whitespace and lowercase the domain part. The local part
/// is left untouched; some mail servers treat it case-sensitively.
pub fn normalize_email(email: &str) -> String {
  let trimmed = email.trim();
  match trimmed.rsplit_once('@') {
    Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
    None => trimmed.to_owned(),
  }
}

fn looks_like_email(value: &str) -> bool {
  let value = value.trim();
  if value.chars().any(char::is_whitespace) {
    return false;
  }
  match value.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_lowercases_domain_only() {
    assert_eq!(normalize_email("  Alice@Example.COM "), "Alice@example.com");
  }

  #[test]
  fn normalize_leaves_addresses_without_at_sign() {
    assert_eq!(normalize_email(" not-an-email "), "not-an-email");
  }

  #[test]
  fn blank_email_is_reported_once() {
    let mut errors = ValidationErrors::new();
    errors.check_email("email", "   ");
    assert_eq!(errors.field("email"), Some(&[BLANK.to_owned()][..]));
  }

  #[test]
  fn malformed_emails_are_rejected() {
    for bad in ["plain", "@example.com", "a@", "a@b@c", "a b@example.com"] {
      let mut errors = ValidationErrors::new();
      errors.check_email("email", bad);
      assert_eq!(
        errors.field("email"),
        Some(&[INVALID_EMAIL.to_owned()][..]),
        "{bad:?} should be invalid"
      );
    }
  }

  #[test]
  fn text_length_counts_characters_not_bytes() {
    let mut errors = ValidationErrors::new();
    errors.clean_text("status_text", &"é".repeat(MAX_STATUS_TEXT_LEN), MAX_STATUS_TEXT_LEN);
    assert!(errors.is_empty());

    errors.clean_text("status_text", &"x".repeat(MAX_STATUS_TEXT_LEN + 1), MAX_STATUS_TEXT_LEN);
    assert_eq!(errors.field("status_text"), Some(&[too_long(255)][..]));
  }

  #[test]
  fn text_is_trimmed_before_checks() {
    let mut errors = ValidationErrors::new();
    assert_eq!(errors.clean_text("name", "  abcdefghij ", 10), "abcdefghij");
    assert!(errors.is_empty());

    errors.clean_text("name", " \t\n ", 10);
    assert_eq!(errors.field("name"), Some(&[BLANK.to_owned()][..]));
  }

  #[test]
  fn errors_serialise_as_field_map() {
    let mut errors = ValidationErrors::new();
    errors.add("name", REQUIRED);
    errors.add("email", BLANK);
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "email": ["This field may not be blank."],
        "name":  ["This field is required."],
      })
    );
  }

  #[test]
  fn require_records_missing_fields() {
    let mut errors = ValidationErrors::new();
    assert_eq!(errors.require("name", Some("A")), Some("A"));
    assert_eq!(errors.require::<String>("email", None), None);
    assert_eq!(errors.field("email"), Some(&[REQUIRED.to_owned()][..]));
    assert!(errors.field("name").is_none());
  }

  #[test]
  fn finish_passes_value_through_when_clean() {
    assert_eq!(ValidationErrors::new().finish(7), Ok(7));
    assert!(ValidationErrors::single("x", BLANK).finish(7).is_err());
  }
}
