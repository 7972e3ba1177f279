//! Conversion between wire bodies and domain records.
//!
//! Input bodies keep every field optional so that a missing field becomes a
//! field-keyed "This field is required." message instead of a generic JSON
//! rejection. Output views list exactly the fields a client may see: the
//! password is write-only, and ids, owners and timestamps are read-only.

use chrono::{DateTime, Utc};
use profiles_core::{
  account::{Account, AccountChanges, NewAccount},
  feed::{FeedItem, NewFeedItem},
  validation::ValidationErrors,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Profiles ─────────────────────────────────────────────────────────────────

/// Body accepted by `POST`, `PUT` and `PATCH` on `/profile/`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
  pub email:    Option<String>,
  pub name:     Option<String>,
  #[serde(alias = "secret")]
  pub password: Option<String>,
}

impl ProfileInput {
  /// Registration: every field is required.
  pub fn into_new_account(self) -> Result<NewAccount, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let email    = errors.require("email", self.email);
    let name     = errors.require("name", self.name);
    let password = errors.require("password", self.password);
    match (email, name, password) {
      (Some(email), Some(name), Some(password)) => {
        NewAccount::new(email, name, password).prepare()
      }
      _ => Err(errors),
    }
  }

  /// Full update (`PUT`): every field is required.
  pub fn into_replacement(self) -> Result<AccountChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("email", self.email.as_ref());
    errors.require("name", self.name.as_ref());
    errors.require("password", self.password.as_ref());
    errors.finish(())?;
    self.into_changes()
  }

  /// Partial update (`PATCH`): absent fields are left alone.
  pub fn into_changes(self) -> Result<AccountChanges, ValidationErrors> {
    AccountChanges {
      email:    self.email,
      name:     self.name,
      password: self.password,
    }
    .prepare()
  }
}

/// What clients see of an account. No password field.
#[derive(Debug, Serialize)]
pub struct ProfileView {
  pub id:    Uuid,
  pub email: String,
  pub name:  String,
}

impl From<Account> for ProfileView {
  fn from(a: Account) -> Self {
    Self { id: a.id, email: a.email, name: a.name }
  }
}

// ─── Feed ─────────────────────────────────────────────────────────────────────

/// Body accepted by `POST`, `PUT` and `PATCH` on `/feed/`. Read-only fields
/// (`id`, `owner`, `created_on`) are ignored if a client sends them.
#[derive(Debug, Default, Deserialize)]
pub struct FeedItemInput {
  pub status_text: Option<String>,
}

impl FeedItemInput {
  /// Create or full update: `status_text` is required.
  pub fn into_new_item(self) -> Result<NewFeedItem, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(text) = errors.require("status_text", self.status_text) else {
      return Err(errors);
    };
    NewFeedItem::new(text).prepare()
  }

  /// Partial update: `None` when there is nothing to change.
  pub fn into_patch(self) -> Result<Option<NewFeedItem>, ValidationErrors> {
    match self.status_text {
      Some(_) => self.into_new_item().map(Some),
      None => Ok(None),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct FeedItemView {
  pub id:          Uuid,
  pub owner:       Uuid,
  pub status_text: String,
  pub created_on:  DateTime<Utc>,
}

impl From<FeedItem> for FeedItemView {
  fn from(i: FeedItem) -> Self {
    Self {
      id:          i.id,
      owner:       i.owner,
      status_text: i.status_text,
      created_on:  i.created_on,
    }
  }
}
