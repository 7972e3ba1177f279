//! The `ProfileStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `profiles-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountChanges, AccountQuery, NewAccount},
  error::AsCoreError,
  feed::{FeedItem, FeedQuery, NewFeedItem},
  token::IssuedToken,
};

/// Abstraction over a profiles backend: accounts, their login tokens, and
/// their feed items.
///
/// Every write runs in a single backend transaction; a failed write leaves
/// nothing behind. Permission checks are the caller's job; the store only
/// enforces data invariants (unique email, owner exists, field bounds).
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + AsCoreError + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Validate `input`, normalise its email, hash its password and persist a
  /// regular account.
  ///
  /// Fails with a validation error when the email is empty or malformed,
  /// and with a duplicate-email error when the normalised email is taken.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// As [`ProfileStore::create_account`], with the staff and superuser flags
  /// set.
  fn create_superuser(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look up an active account by normalised email and verify `password`
  /// against its stored hash.
  fn authenticate(
    &self,
    email: String,
    password: String,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Retrieve an account by id. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// List accounts matching `query`, oldest first.
  fn list_accounts(
    &self,
    query: AccountQuery,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Apply `changes` to an account and return the updated record.
  fn update_account(
    &self,
    id: Uuid,
    changes: AccountChanges,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Set the active flag. Inactive accounts cannot log in and their tokens
  /// stop working; reactivation restores both.
  fn set_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Delete an account together with its feed items and tokens.
  fn delete_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tokens ────────────────────────────────────────────────────────────

  /// Issue a new bearer token for an existing account.
  fn issue_token(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<IssuedToken, Self::Error>> + Send + '_;

  /// The account a token key belongs to, or `None` for unknown keys.
  fn resolve_token(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Feed ──────────────────────────────────────────────────────────────

  /// Persist a post owned by `owner`. `created_on` is set by the store.
  fn create_feed_item(
    &self,
    owner: Uuid,
    input: NewFeedItem,
  ) -> impl Future<Output = Result<FeedItem, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get_feed_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FeedItem>, Self::Error>> + Send + '_;

  /// List posts matching `query`, oldest first.
  fn list_feed_items(
    &self,
    query: FeedQuery,
  ) -> impl Future<Output = Result<Vec<FeedItem>, Self::Error>> + Send + '_;

  /// Replace the text of a post. Owner and `created_on` never change.
  fn update_feed_item(
    &self,
    id: Uuid,
    input: NewFeedItem,
  ) -> impl Future<Output = Result<FeedItem, Self::Error>> + Send + '_;

  fn delete_feed_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
