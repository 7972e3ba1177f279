//! HTTP JSON API for the profiles service.
//!
//! Exposes an axum [`Router`] with account registration and self-service
//! editing, token login, a public status feed, and two demonstration
//! endpoints. Backed by any [`ProfileStore`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod feed;
pub mod hello;
pub mod login;
pub mod profiles;
pub mod serializers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use profiles_core::store::ProfileStore;
use serde::Deserialize;

use hello::HelloNames;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PROFILES_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ProfileStore> {
  pub store: Arc<S>,
  pub hello: HelloNames,
}

impl<S: ProfileStore> AppState<S> {
  pub fn new(store: S) -> Self {
    Self { store: Arc::new(store), hello: HelloNames::default() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/hello-view/",
      get(hello::view_get)
        .post(hello::view_post)
        .put(hello::view_put)
        .patch(hello::view_patch)
        .delete(hello::view_delete),
    )
    .route(
      "/hello-viewset/",
      get(hello::viewset_list).post(hello::viewset_create),
    )
    .route(
      "/hello-viewset/{id}/",
      get(hello::viewset_retrieve)
        .put(hello::viewset_update)
        .patch(hello::viewset_partial_update)
        .delete(hello::viewset_destroy),
    )
    .route(
      "/profile/",
      get(profiles::list::<S>).post(profiles::create::<S>),
    )
    .route(
      "/profile/{id}/",
      get(profiles::get_one::<S>)
        .put(profiles::update::<S>)
        .patch(profiles::partial_update::<S>)
        .delete(profiles::destroy::<S>),
    )
    .route("/feed/", get(feed::list::<S>).post(feed::create::<S>))
    .route(
      "/feed/{id}/",
      get(feed::get_one::<S>)
        .put(feed::update::<S>)
        .patch(feed::partial_update::<S>)
        .delete(feed::destroy::<S>),
    )
    .route("/login/", post(login::handler::<S>))
    .with_state(state)
}
