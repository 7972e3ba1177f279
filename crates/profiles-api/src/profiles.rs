//! Handlers for `/profile/` endpoints.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/profile/`       | Optional `?id`, `?email`, `?search` |
//! | `POST`   | `/profile/`       | Registration; no token needed; returns 201 |
//! | `GET`    | `/profile/{id}/`  | 404 if not found |
//! | `PUT`    | `/profile/{id}/`  | Self only; every field required |
//! | `PATCH`  | `/profile/{id}/`  | Self only |
//! | `DELETE` | `/profile/{id}/`  | Self only; removes the account's feed too |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use profiles_core::{
  access::authorize_modify,
  account::{Account, AccountChanges, AccountQuery},
  store::ProfileStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, RecordId},
  serializers::{ProfileInput, ProfileView},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub id:     Option<Uuid>,
  pub email:  Option<String>,
  /// Case-insensitive substring over name and email.
  pub search: Option<String>,
}

/// `GET /profile/[?id=...][&email=...][&search=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProfileView>>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let query = AccountQuery {
    id:     params.id,
    email:  params.email,
    search: params.search,
  };
  let accounts = state
    .store
    .list_accounts(query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(accounts.into_iter().map(ProfileView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /profile/` body: `{"email":"...","name":"...","password":"..."}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ProfileInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let input = body.into_new_account()?;
  let account = state
    .store
    .create_account(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(account_id = %account.id, "account registered");
  Ok((StatusCode::CREATED, Json(ProfileView::from(account))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profile/{id}/`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
) -> Result<Json<ProfileView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let account = fetch(&*state.store, id).await?;
  Ok(Json(account.into()))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /profile/{id}/`: every field required.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<ProfileInput>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let changes = body.into_replacement()?;
  apply(&*state.store, id, &actor, changes).await
}

/// `PATCH /profile/{id}/`: any subset of fields.
pub async fn partial_update<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<ProfileInput>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let changes = body.into_changes()?;
  apply(&*state.store, id, &actor, changes).await
}

async fn apply<S: ProfileStore>(
  store: &S,
  id: Uuid,
  actor: &Account,
  changes: AccountChanges,
) -> Result<Json<ProfileView>, ApiError> {
  let account = fetch_for_modify(store, id, actor).await?;
  if changes.is_empty() {
    return Ok(Json(account.into()));
  }
  let updated = store
    .update_account(id, changes)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated.into()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /profile/{id}/`
pub async fn destroy<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
  Authenticated(actor): Authenticated,
) -> Result<StatusCode, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  fetch_for_modify(&*state.store, id, &actor).await?;
  state
    .store
    .delete_account(id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(account_id = %id, "account deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn fetch<S: ProfileStore>(store: &S, id: Uuid) -> Result<Account, ApiError> {
  store
    .get_account(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))
}

/// 404 before 403: an account's existence is public anyway.
async fn fetch_for_modify<S: ProfileStore>(
  store: &S,
  id: Uuid,
  actor: &Account,
) -> Result<Account, ApiError> {
  let account = fetch(store, id).await?;
  authorize_modify(actor, &account).inspect_err(|_| {
    tracing::warn!(actor = %actor.id, account_id = %id, "profile change denied");
  })?;
  Ok(account)
}
