//! Handler for `POST /login/`.

use axum::{Json, extract::State};
use profiles_core::{store::ProfileStore, validation::ValidationErrors};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::JsonBody};

/// `{"email":"...","password":"..."}`; `username` and `secret` are accepted
/// as aliases.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(alias = "username")]
  pub email:    Option<String>,
  #[serde(alias = "secret")]
  pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub token: String,
}

/// `POST /login/`: exchanges credentials for a bearer token.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let mut errors = ValidationErrors::new();
  let email    = errors.require("email", body.email);
  let password = errors.require("password", body.password);
  let (Some(email), Some(password)) = (email, password) else {
    return Err(errors.into());
  };

  let account = state
    .store
    .authenticate(email, password)
    .await
    .map_err(ApiError::store)
    .inspect_err(|e| tracing::info!(error = %e, "login rejected"))?;

  let token = state
    .store
    .issue_token(account.id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(account_id = %account.id, "token issued");

  Ok(Json(TokenResponse { token: token.key }))
}
