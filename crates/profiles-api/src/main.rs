//! profiles server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `PROFILES_*` environment variables, opens the SQLite store and serves the
//! JSON API over HTTP.
//!
//! # Bootstrapping an administrator
//!
//! ```sh
//! cargo run -p profiles-api --bin server -- --create-superuser --email admin@example.com --name Admin
//! ```
//!
//! The password is read from stdin.
//!
//! `--deactivate <email>` blocks an account's login and tokens;
//! `--activate <email>` restores them.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use profiles_api::{AppState, ServerConfig};
use profiles_core::{
  account::{AccountQuery, NewAccount},
  store::ProfileStore,
};
use profiles_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Profiles API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create a superuser (password on stdin) and exit.
  #[arg(long)]
  create_superuser: bool,

  /// Email for `--create-superuser`.
  #[arg(long)]
  email: Option<String>,

  /// Display name for `--create-superuser`.
  #[arg(long)]
  name: Option<String>,

  /// Deactivate the account with this email and exit.
  #[arg(long, value_name = "EMAIL", conflicts_with = "activate")]
  deactivate: Option<String>,

  /// Reactivate the account with this email and exit.
  #[arg(long, value_name = "EMAIL")]
  activate: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("store_path", "profiles.db")?
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("PROFILES"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.create_superuser {
    let (Some(email), Some(name)) = (cli.email, cli.name) else {
      anyhow::bail!("--create-superuser needs --email and --name");
    };
    let password = read_password()?;
    let account = store
      .create_superuser(NewAccount::new(email, name, password))
      .await
      .context("failed to create superuser")?;
    tracing::info!(account_id = %account.id, email = %account.email, "superuser created");
    return Ok(());
  }

  let toggle = cli
    .deactivate
    .map(|email| (email, false))
    .or(cli.activate.map(|email| (email, true)));
  if let Some((email, active)) = toggle {
    set_active(&store, email, active).await?;
    return Ok(());
  }

  let app = profiles_api::router(AppState::new(store)).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn set_active(store: &SqliteStore, email: String, active: bool) -> anyhow::Result<()> {
  let query = AccountQuery { email: Some(email.clone()), ..Default::default() };
  let account = store
    .list_accounts(query)
    .await
    .context("failed to look up account")?
    .into_iter()
    .next()
    .with_context(|| format!("no account with email {email}"))?;
  store
    .set_active(account.id, active)
    .await
    .context("failed to update account")?;
  tracing::info!(account_id = %account.id, active, "account activity changed");
  Ok(())
}

/// Read one line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_owned();
  anyhow::ensure!(!password.is_empty(), "password may not be empty");
  Ok(password)
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expansion() {
    let plain = Path::new("/var/lib/profiles.db");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/profiles.db")),
        PathBuf::from(home).join("profiles.db")
      );
    }
  }

  #[tokio::test]
  async fn toggles_account_by_email() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let account = store
      .create_account(NewAccount::new("a@X.com", "A", "pw123456"))
      .await
      .unwrap();

    set_active(&store, "a@x.com".into(), false).await.unwrap();
    assert!(!store.get_account(account.id).await.unwrap().unwrap().is_active);

    set_active(&store, "a@X.COM".into(), true).await.unwrap();
    assert!(store.get_account(account.id).await.unwrap().unwrap().is_active);

    assert!(set_active(&store, "nobody@x.com".into(), true).await.is_err());
  }
}
