//! Feed items: short status posts owned by exactly one account.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::validation::{MAX_STATUS_TEXT_LEN, ValidationErrors};

/// A persisted status post.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
  pub id:          Uuid,
  /// The account that wrote the post; always the authenticated caller at
  /// creation time, never client input.
  pub owner:       Uuid,
  pub status_text: String,
  /// Server-assigned; never changes after creation.
  pub created_on:  DateTime<Utc>,
}

impl fmt::Display for FeedItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.status_text)
  }
}

/// Input to [`crate::store::ProfileStore::create_feed_item`] and
/// [`crate::store::ProfileStore::update_feed_item`].
#[derive(Debug, Clone)]
pub struct NewFeedItem {
  pub status_text: String,
}

impl NewFeedItem {
  pub fn new(status_text: impl Into<String>) -> Self {
    Self { status_text: status_text.into() }
  }

  /// Trim and check the text. Over-long text is rejected rather than
  /// truncated.
  pub fn prepare(self) -> Result<Self, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let status_text =
      errors.clean_text("status_text", &self.status_text, MAX_STATUS_TEXT_LEN);
    errors.finish(Self { status_text })
  }
}

/// Parameters for [`crate::store::ProfileStore::list_feed_items`].
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
  /// Restrict to one account's posts. `None` lists every post.
  pub owner: Option<Uuid>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_text_bounds() {
    assert!(NewFeedItem::new("hello").prepare().is_ok());
    assert!(NewFeedItem::new("x".repeat(255)).prepare().is_ok());
    assert!(NewFeedItem::new("x".repeat(256)).prepare().is_err());
    assert!(NewFeedItem::new("  ").prepare().is_err());
  }

  #[test]
  fn status_text_is_trimmed() {
    let item = NewFeedItem::new(format!("  {}\n", "x".repeat(255))).prepare().unwrap();
    assert_eq!(item.status_text, "x".repeat(255));
  }
}
