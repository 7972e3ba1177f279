//! SQL schema for the profiles SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `foreign_keys` is a per-connection setting; the store holds exactly one
/// connection, so enabling it here covers every statement it runs.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE CHECK (length(email) BETWEEN 1 AND 255),
    name          TEXT NOT NULL CHECK (length(name) <= 255),
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    is_active     INTEGER NOT NULL DEFAULT 1,
    is_staff      INTEGER NOT NULL DEFAULT 0,
    is_superuser  INTEGER NOT NULL DEFAULT 0,
    date_joined   TEXT NOT NULL           -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS feed_items (
    feed_item_id TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    status_text  TEXT NOT NULL CHECK (length(status_text) <= 255),
    created_on   TEXT NOT NULL            -- ISO 8601 UTC; never updated
);

-- Only the SHA-256 digest of each key is kept.
CREATE TABLE IF NOT EXISTS auth_tokens (
    key_digest TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    created    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS feed_items_owner_idx  ON feed_items(owner_id);
CREATE INDEX IF NOT EXISTS auth_tokens_owner_idx ON auth_tokens(account_id);

PRAGMA user_version = 1;
";
