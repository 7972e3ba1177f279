//! [`SqliteStore`]: the SQLite implementation of [`ProfileStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use profiles_core::{
  Error as CoreError,
  account::{Account, AccountChanges, AccountQuery, NewAccount, Role},
  feed::{FeedItem, FeedQuery, NewFeedItem},
  secret::{hash_secret, verify_secret},
  store::ProfileStore,
  token::{IssuedToken, digest_key, generate_key},
  validation::normalize_email,
};

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, FEED_ITEM_COLUMNS, RawAccount, RawFeedItem, contains_pattern,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// What a write transaction found, decided inside the connection thread so
/// the check and the write are atomic.
enum Outcome<T> {
  Done(T),
  Missing,
  EmailTaken,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A profiles store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Validate, hash and insert a new account with the flags of `role`.
  async fn insert_account(&self, input: NewAccount, role: Role) -> Result<Account> {
    let input = input.prepare().map_err(CoreError::from)?;

    let account = Account {
      id:            Uuid::new_v4(),
      password_hash: hash_secret(&input.password)?,
      email:         input.email,
      name:          input.name,
      is_active:     true,
      is_staff:      role.is_staff(),
      is_superuser:  role.is_superuser(),
      date_joined:   Utc::now(),
    };

    let id_str     = encode_uuid(account.id);
    let email      = account.email.clone();
    let name       = account.name.clone();
    let hash       = account.password_hash.clone();
    let (active, staff, superuser) =
      (account.is_active, account.is_staff, account.is_superuser);
    let joined_str = encode_dt(account.date_joined);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Outcome::EmailTaken);
        }

        tx.execute(
          "INSERT INTO accounts (
             account_id, email, name, password_hash,
             is_active, is_staff, is_superuser, date_joined
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, email, name, hash, active, staff, superuser, joined_str,
          ],
        )?;
        tx.commit()?;
        Ok(Outcome::Done(()))
      })
      .await?;

    match outcome {
      Outcome::Done(()) => Ok(account),
      Outcome::EmailTaken | Outcome::Missing => {
        Err(CoreError::DuplicateEmail(account.email).into())
      }
    }
  }

  async fn account_by_email(&self, email: String) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
            rusqlite::params![email],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    self.insert_account(input, Role::Regular).await
  }

  async fn create_superuser(&self, input: NewAccount) -> Result<Account> {
    self.insert_account(input, Role::Superuser).await
  }

  async fn authenticate(&self, email: String, password: String) -> Result<Account> {
    match self.account_by_email(normalize_email(&email)).await? {
      Some(account) => {
        // Verify before looking at the flag so inactive accounts cost the same.
        let verified = verify_secret(&password, &account.password_hash);
        if verified && account.is_active {
          Ok(account)
        } else {
          Err(CoreError::InvalidCredentials.into())
        }
      }
      None => {
        // Unknown emails cost the same as wrong passwords.
        let _ = hash_secret(&password);
        Err(CoreError::InvalidCredentials.into())
      }
    }
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
            rusqlite::params![id_str],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn list_accounts(&self, query: AccountQuery) -> Result<Vec<Account>> {
    let id_str  = query.id.map(encode_uuid);
    let email   = query.email.as_deref().map(normalize_email);
    let pattern = query.search.as_deref().map(contains_pattern);

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        let mut params: Vec<String> = vec![];
        if let Some(id) = id_str {
          conds.push("account_id = ?");
          params.push(id);
        }
        if let Some(email) = email {
          conds.push("email = ?");
          params.push(email);
        }
        if let Some(pattern) = pattern {
          conds.push("(name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')");
          params.push(pattern.clone());
          params.push(pattern);
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts {where_clause} ORDER BY rowid"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn update_account(&self, id: Uuid, changes: AccountChanges) -> Result<Account> {
    let changes       = changes.prepare().map_err(CoreError::from)?;
    let password_hash = changes.password.as_deref().map(hash_secret).transpose()?;

    let id_str    = encode_uuid(id);
    let email     = changes.email;
    let requested = email.clone().unwrap_or_default();
    let name      = changes.name;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE account_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Outcome::Missing);
        }

        if let Some(email) = &email {
          let taken = tx
            .query_row(
              "SELECT 1 FROM accounts WHERE email = ?1 AND account_id != ?2",
              rusqlite::params![email, id_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if taken {
            return Ok(Outcome::EmailTaken);
          }
        }

        tx.execute(
          "UPDATE accounts SET
             email         = COALESCE(?2, email),
             name          = COALESCE(?3, name),
             password_hash = COALESCE(?4, password_hash)
           WHERE account_id = ?1",
          rusqlite::params![id_str, email, name, password_hash],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
          rusqlite::params![id_str],
          RawAccount::from_row,
        )?;
        tx.commit()?;
        Ok(Outcome::Done(raw))
      })
      .await?;

    match outcome {
      Outcome::Done(raw) => raw.into_account(),
      Outcome::Missing => Err(CoreError::AccountNotFound(id).into()),
      Outcome::EmailTaken => Err(CoreError::DuplicateEmail(requested).into()),
    }
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<Account> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE accounts SET is_active = ?2 WHERE account_id = ?1",
          rusqlite::params![id_str, active],
        )?;
        if n == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
          rusqlite::params![id_str],
          RawAccount::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    match raw {
      Some(raw) => raw.into_account(),
      None => Err(CoreError::AccountNotFound(id).into()),
    }
  }

  async fn delete_account(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    // Feed items and tokens go with it via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM accounts WHERE account_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::AccountNotFound(id).into());
    }
    Ok(())
  }

  // ── Tokens ────────────────────────────────────────────────────────────────

  async fn issue_token(&self, account_id: Uuid) -> Result<IssuedToken> {
    let token = IssuedToken {
      key: generate_key(),
      account_id,
      created: Utc::now(),
    };

    let digest     = digest_key(&token.key);
    let id_str     = encode_uuid(account_id);
    let created_at = encode_dt(token.created);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE account_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Outcome::Missing);
        }
        tx.execute(
          "INSERT INTO auth_tokens (key_digest, account_id, created) VALUES (?1, ?2, ?3)",
          rusqlite::params![digest, id_str, created_at],
        )?;
        tx.commit()?;
        Ok(Outcome::Done(()))
      })
      .await?;

    match outcome {
      Outcome::Done(()) => Ok(token),
      Outcome::Missing | Outcome::EmailTaken => {
        Err(CoreError::AccountNotFound(account_id).into())
      }
    }
  }

  async fn resolve_token(&self, key: String) -> Result<Option<Account>> {
    let digest = digest_key(&key);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT a.account_id, a.email, a.name, a.password_hash,
                    a.is_active, a.is_staff, a.is_superuser, a.date_joined
             FROM auth_tokens t
             JOIN accounts a ON a.account_id = t.account_id
             WHERE t.key_digest = ?1",
            rusqlite::params![digest],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  // ── Feed ──────────────────────────────────────────────────────────────────

  async fn create_feed_item(&self, owner: Uuid, input: NewFeedItem) -> Result<FeedItem> {
    let input = input.prepare().map_err(CoreError::from)?;

    let item = FeedItem {
      id:          Uuid::new_v4(),
      owner,
      status_text: input.status_text,
      created_on:  Utc::now(),
    };

    let id_str    = encode_uuid(item.id);
    let owner_str = encode_uuid(owner);
    let text      = item.status_text.clone();
    let on_str    = encode_dt(item.created_on);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE account_id = ?1",
            rusqlite::params![owner_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Outcome::Missing);
        }
        tx.execute(
          "INSERT INTO feed_items (feed_item_id, owner_id, status_text, created_on)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, owner_str, text, on_str],
        )?;
        tx.commit()?;
        Ok(Outcome::Done(()))
      })
      .await?;

    match outcome {
      Outcome::Done(()) => Ok(item),
      Outcome::Missing | Outcome::EmailTaken => Err(CoreError::AccountNotFound(owner).into()),
    }
  }

  async fn get_feed_item(&self, id: Uuid) -> Result<Option<FeedItem>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFeedItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FEED_ITEM_COLUMNS} FROM feed_items WHERE feed_item_id = ?1"),
            rusqlite::params![id_str],
            RawFeedItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFeedItem::into_feed_item).transpose()
  }

  async fn list_feed_items(&self, query: FeedQuery) -> Result<Vec<FeedItem>> {
    let owner_str = query.owner.map(encode_uuid);

    let raws: Vec<RawFeedItem> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(owner) = owner_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_ITEM_COLUMNS} FROM feed_items WHERE owner_id = ?1 ORDER BY rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawFeedItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_ITEM_COLUMNS} FROM feed_items ORDER BY rowid"
          ))?;
          stmt
            .query_map([], RawFeedItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedItem::into_feed_item).collect()
  }

  async fn update_feed_item(&self, id: Uuid, input: NewFeedItem) -> Result<FeedItem> {
    let input = input.prepare().map_err(CoreError::from)?;

    let id_str = encode_uuid(id);
    let text   = input.status_text;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE feed_items SET status_text = ?2 WHERE feed_item_id = ?1",
          rusqlite::params![id_str, text],
        )?;
        if n == 0 {
          return Ok(Outcome::Missing);
        }
        let raw = tx.query_row(
          &format!("SELECT {FEED_ITEM_COLUMNS} FROM feed_items WHERE feed_item_id = ?1"),
          rusqlite::params![id_str],
          RawFeedItem::from_row,
        )?;
        tx.commit()?;
        Ok(Outcome::Done(raw))
      })
      .await?;

    match outcome {
      Outcome::Done(raw) => raw.into_feed_item(),
      Outcome::Missing | Outcome::EmailTaken => Err(CoreError::FeedItemNotFound(id).into()),
    }
  }

  async fn delete_feed_item(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM feed_items WHERE feed_item_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::FeedItemNotFound(id).into());
    }
    Ok(())
  }
}
