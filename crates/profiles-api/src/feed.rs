//! Handlers for `/feed/` endpoints.
//!
//! | Method   | Path           | Notes |
//! |----------|----------------|-------|
//! | `GET`    | `/feed/`       | Everyone's posts; optional `?owner=<id>` |
//! | `POST`   | `/feed/`       | Token required; owner is the caller; 201 |
//! | `GET`    | `/feed/{id}/`  | 404 if not found |
//! | `PUT`    | `/feed/{id}/`  | Owner only; `status_text` required |
//! | `PATCH`  | `/feed/{id}/`  | Owner only |
//! | `DELETE` | `/feed/{id}/`  | Owner only |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use profiles_core::{
  access::authorize_modify,
  account::Account,
  feed::{FeedItem, FeedQuery, NewFeedItem},
  store::ProfileStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, RecordId},
  serializers::{FeedItemInput, FeedItemView},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Option<Uuid>,
}

/// `GET /feed/[?owner=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<FeedItemView>>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let items = state
    .store
    .list_feed_items(FeedQuery { owner: params.owner })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items.into_iter().map(FeedItemView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /feed/` body: `{"status_text":"..."}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<FeedItemInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let input = body.into_new_item()?;
  let item = state
    .store
    .create_feed_item(actor.id, input)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(feed_item_id = %item.id, owner = %actor.id, "feed item created");
  Ok((StatusCode::CREATED, Json(FeedItemView::from(item))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /feed/{id}/`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
) -> Result<Json<FeedItemView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let item = fetch(&*state.store, id).await?;
  Ok(Json(item.into()))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /feed/{id}/`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<FeedItemInput>,
) -> Result<Json<FeedItemView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let input = body.into_new_item()?;
  apply(&*state.store, id, &actor, Some(input)).await
}

/// `PATCH /feed/{id}/`
pub async fn partial_update<S>(
  State(state): State<AppState<S>>,
  RecordId(id): RecordId,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<FeedItemInput>,
) -> Result<Json<FeedItemView>, ApiError>
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  let input = body.into_patch()?;
  apply(&*state.store, id, &actor, input).await
}

async fn apply<S: ProfileStore>(
  store: &S,
  id: Uuid,
  actor: &Account,
  input: Option<NewFeedItem>,
) -> Result<Json<FeedItemView>, ApiError> {
  let item = fetch_for_modify(store, id, actor).await?;
  let Some(input) = input else {
    return Ok(Json(item.into()));
  };
  let updated = store
    .update_feed_item(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated.into()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /feed/{id}/`
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
    .delete_feed_item(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn fetch<S: ProfileStore>(store: &S, id: Uuid) -> Result<FeedItem, ApiError> {
  store
    .get_feed_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("feed item {id} not found")))
}

async fn fetch_for_modify<S: ProfileStore>(
  store: &S,
  id: Uuid,
  actor: &Account,
) -> Result<FeedItem, ApiError> {
  let item = fetch(store, id).await?;
  authorize_modify(actor, &item).inspect_err(|_| {
    tracing::warn!(actor = %actor.id, feed_item_id = %id, "feed change denied");
  })?;
  Ok(item)
}
