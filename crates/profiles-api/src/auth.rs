//! Bearer-token extractor.
//!
//! Clients obtain a token from `POST /login/` and present it as
//! `Authorization: Token <key>` (or `Bearer <key>`) on mutating requests.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use profiles_core::{account::Account, store::ProfileStore};

use crate::{AppState, error::ApiError};

/// The acting account. Present in a handler means the request carried a
/// valid token for an active account.
pub struct Authenticated(pub Account);

/// Pull the token key out of the `Authorization` header, if any.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let key = value
    .strip_prefix("Token ")
    .or_else(|| value.strip_prefix("Bearer "))?
    .trim();
  (!key.is_empty()).then_some(key)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let key = token_from_headers(&parts.headers)
      .ok_or(ApiError::Unauthenticated)?
      .to_owned();

    let account = state
      .store
      .resolve_token(key)
      .await
      .map_err(ApiError::store)?
      .filter(|a| a.is_active)
      .ok_or(ApiError::Unauthenticated)?;

    Ok(Authenticated(account))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::Request;
  use profiles_core::account::NewAccount;
  use profiles_store_sqlite::SqliteStore;

  use super::*;
  use crate::hello::HelloNames;

  async fn make_state() -> AppState<SqliteStore> {
    AppState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      hello: HelloNames::default(),
    }
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<Authenticated, ApiError> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn with_auth(value: &str) -> Request<axum::body::Body> {
    Request::builder()
      .header(header::AUTHORIZATION, value)
      .body(axum::body::Body::empty())
      .unwrap()
  }

  #[test]
  fn token_header_forms() {
    let mut headers = HeaderMap::new();
    assert_eq!(token_from_headers(&headers), None);

    headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
    assert_eq!(token_from_headers(&headers), Some("abc"));

    headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
    assert_eq!(token_from_headers(&headers), Some("abc"));

    headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
    assert_eq!(token_from_headers(&headers), None);

    headers.insert(header::AUTHORIZATION, "Token ".parse().unwrap());
    assert_eq!(token_from_headers(&headers), None);
  }

  #[tokio::test]
  async fn valid_token_yields_account() {
    let state = make_state().await;
    let account = state
      .store
      .create_account(NewAccount::new("a@x.com", "A", "pw123456"))
      .await
      .unwrap();
    let token = state.store.issue_token(account.id).await.unwrap();

    let Authenticated(actor) = extract(with_auth(&format!("Token {}", token.key)), &state)
      .await
      .unwrap();
    assert_eq!(actor.id, account.id);
  }

  #[tokio::test]
  async fn deactivated_account_is_rejected() {
    let state = make_state().await;
    let account = state
      .store
      .create_account(NewAccount::new("a@x.com", "A", "pw123456"))
      .await
      .unwrap();
    let token = state.store.issue_token(account.id).await.unwrap();
    let header = format!("Bearer {}", token.key);

    state.store.set_active(account.id, false).await.unwrap();
    let result = extract(with_auth(&header), &state).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));

    state.store.set_active(account.id, true).await.unwrap();
    assert!(extract(with_auth(&header), &state).await.is_ok());
  }

  #[tokio::test]
  async fn unknown_token() {
    let state = make_state().await;
    let result = extract(with_auth("Token deadbeef"), &state).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state().await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthenticated)));
  }
}
