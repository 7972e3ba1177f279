//! Object-level permissions.
//!
//! Reads are open to everyone. A record may only be modified by the account
//! that owns it; for an account record that is the account itself.

use uuid::Uuid;

use crate::{Error, Result, account::Account, feed::FeedItem};

/// A record with a single owning account.
pub trait Owned {
  fn owner_id(&self) -> Uuid;
}

impl Owned for Account {
  fn owner_id(&self) -> Uuid { self.id }
}

impl Owned for FeedItem {
  fn owner_id(&self) -> Uuid { self.owner }
}

/// Whether `actor` may update or delete `record`.
pub fn may_modify<R: Owned + ?Sized>(actor: &Account, record: &R) -> bool {
  actor.id == record.owner_id()
}

/// Fail with [`Error::Forbidden`] unless `actor` owns `record`.
pub fn authorize_modify<R: Owned + ?Sized>(actor: &Account, record: &R) -> Result<()> {
  if may_modify(actor, record) {
    Ok(())
  } else {
    Err(Error::Forbidden { actor: actor.id, owner: record.owner_id() })
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn account() -> Account {
    Account {
      id:            Uuid::new_v4(),
      email:         "a@x.com".into(),
      name:          "A".into(),
      password_hash: String::new(),
      is_active:     true,
      is_staff:      false,
      is_superuser:  false,
      date_joined:   Utc::now(),
    }
  }

  fn post_by(owner: &Account) -> FeedItem {
    FeedItem {
      id:          Uuid::new_v4(),
      owner:       owner.id,
      status_text: "hello".into(),
      created_on:  Utc::now(),
    }
  }

  #[test]
  fn owners_may_modify_their_records() {
    let a = account();
    assert!(may_modify(&a, &a));
    assert!(authorize_modify(&a, &post_by(&a)).is_ok());
  }

  #[test]
  fn others_are_forbidden() {
    let a = account();
    let b = account();
    assert!(!may_modify(&b, &a));

    let err = authorize_modify(&b, &post_by(&a)).unwrap_err();
    assert!(matches!(err, Error::Forbidden { actor, owner } if actor == b.id && owner == a.id));
  }

  #[test]
  fn superusers_get_no_special_treatment() {
    let a = account();
    let mut root = account();
    root.is_staff = true;
    root.is_superuser = true;
    assert!(!may_modify(&root, &post_by(&a)));
  }
}
