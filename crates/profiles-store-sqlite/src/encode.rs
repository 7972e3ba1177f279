//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Flags are stored as 0/1 integers.

use chrono::{DateTime, Utc};
use profiles_core::{account::Account, feed::FeedItem};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// A `%text%` pattern for use with `LIKE ... ESCAPE '\'`.
pub fn contains_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  escaped.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str = "account_id, email, name, password_hash, \
                                   is_active, is_staff, is_superuser, date_joined";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
  pub is_active:     bool,
  pub is_staff:      bool,
  pub is_superuser:  bool,
  pub date_joined:   String,
}

impl RawAccount {
  /// Read a row selected with [`ACCOUNT_COLUMNS`] (in that order).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      password_hash: row.get(3)?,
      is_active:     row.get(4)?,
      is_staff:      row.get(5)?,
      is_superuser:  row.get(6)?,
      date_joined:   row.get(7)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:            decode_uuid(&self.account_id)?,
      email:         self.email,
      name:          self.name,
      password_hash: self.password_hash,
      is_active:     self.is_active,
      is_staff:      self.is_staff,
      is_superuser:  self.is_superuser,
      date_joined:   decode_dt(&self.date_joined)?,
    })
  }
}

/// Column list matching [`RawFeedItem::from_row`].
pub const FEED_ITEM_COLUMNS: &str = "feed_item_id, owner_id, status_text, created_on";

/// Raw strings read directly from a `feed_items` row.
pub struct RawFeedItem {
  pub feed_item_id: String,
  pub owner_id:     String,
  pub status_text:  String,
  pub created_on:   String,
}

impl RawFeedItem {
  /// Read a row selected with [`FEED_ITEM_COLUMNS`] (in that order).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      feed_item_id: row.get(0)?,
      owner_id:     row.get(1)?,
      status_text:  row.get(2)?,
      created_on:   row.get(3)?,
    })
  }

  pub fn into_feed_item(self) -> Result<FeedItem> {
    Ok(FeedItem {
      id:          decode_uuid(&self.feed_item_id)?,
      owner:       decode_uuid(&self.owner_id)?,
      status_text: self.status_text,
      created_on:  decode_dt(&self.created_on)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn contains_pattern_escapes_wildcards() {
    assert_eq!(contains_pattern("ali"), "%ali%");
    assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }

  #[test]
  fn timestamps_round_trip_through_rfc3339() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
    assert!(decode_dt("yesterday").is_err());
  }
}
