//! Demonstration endpoints: `/hello-view/` and `/hello-viewset/`.
//!
//! Nothing here touches the store. The viewset keeps a process-lifetime list
//! of names in [`HelloNames`]; it is lost on restart.

use std::sync::Arc;

use axum::{
  Json,
  extract::{FromRef, Path, State},
};
use profiles_core::{store::ProfileStore, validation::ValidationErrors};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{AppState, error::ApiError, extract::JsonBody};

pub const MAX_HELLO_NAME_LEN: usize = 10;

const AN_APIVIEW: [&str; 4] = [
  "Uses HTTP methods as functions (get, post, patch, put, delete)",
  "Is similar to a traditional web view",
  "Gives you the most control over your application logic",
  "Is mapped manually to URLs",
];

const A_VIEWSET: [&str; 3] = [
  "Uses actions (list, create, retrieve, update, partial_update, destroy)",
  "Automatically maps to URLs using routers",
  "Provides more functionality with less code",
];

// ─── State ────────────────────────────────────────────────────────────────────

/// Names posted to `/hello-viewset/`. Not persisted.
#[derive(Clone, Default)]
pub struct HelloNames(Arc<Mutex<Vec<String>>>);

impl HelloNames {
  pub async fn push(&self, name: String) { self.0.lock().await.push(name); }

  pub async fn snapshot(&self) -> Vec<String> { self.0.lock().await.clone() }
}

impl<S> FromRef<AppState<S>> for HelloNames
where
  S: ProfileStore,
{
  fn from_ref(state: &AppState<S>) -> Self { state.hello.clone() }
}

// ─── Input ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HelloBody {
  pub name: Option<String>,
}

impl HelloBody {
  fn validated_name(self) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(name) = errors.require("name", self.name) else {
      return Err(errors);
    };
    let name = errors.clean_text("name", &name, MAX_HELLO_NAME_LEN);
    errors.finish(name)
  }
}

// ─── /hello-view/ ─────────────────────────────────────────────────────────────

/// `GET /hello-view/`
pub async fn view_get() -> Json<Value> {
  Json(json!({ "message": "Hello!", "an_apiview": AN_APIVIEW }))
}

/// `POST /hello-view/` body: `{"name":"..."}`, at most 10 characters.
pub async fn view_post(
  JsonBody(body): JsonBody<HelloBody>,
) -> Result<Json<Value>, ApiError> {
  let name = body.validated_name()?;
  Ok(Json(json!({ "message": format!("Hello {name}") })))
}

/// `PUT /hello-view/`
pub async fn view_put() -> Json<Value> { Json(json!({ "method": "PUT" })) }

/// `PATCH /hello-view/`
pub async fn view_patch() -> Json<Value> { Json(json!({ "method": "PATCH" })) }

/// `DELETE /hello-view/`
pub async fn view_delete() -> Json<Value> { Json(json!({ "method": "DELETE" })) }

// ─── /hello-viewset/ ──────────────────────────────────────────────────────────

/// `GET /hello-viewset/`
pub async fn viewset_list(State(names): State<HelloNames>) -> Json<Value> {
  Json(json!({
    "message":   "Hello!",
    "a_viewset": A_VIEWSET,
    "names":     names.snapshot().await,
  }))
}

/// `POST /hello-viewset/`: validates like the hello view, then remembers the
/// name.
pub async fn viewset_create(
  State(names): State<HelloNames>,
  JsonBody(body): JsonBody<HelloBody>,
) -> Result<Json<Value>, ApiError> {
  let name = body.validated_name()?;
  let message = format!("Hello {name}!");
  names.push(name).await;
  Ok(Json(json!({ "message": message })))
}

/// `GET /hello-viewset/{id}/`
pub async fn viewset_retrieve(Path(_id): Path<String>) -> Json<Value> {
  Json(json!({ "http_method": "GET" }))
}

/// `PUT /hello-viewset/{id}/`
pub async fn viewset_update(Path(_id): Path<String>) -> Json<Value> {
  Json(json!({ "http_method": "PUT" }))
}

/// `PATCH /hello-viewset/{id}/`
pub async fn viewset_partial_update(Path(_id): Path<String>) -> Json<Value> {
  Json(json!({ "http_method": "PATCH" }))
}

/// `DELETE /hello-viewset/{id}/`
pub async fn viewset_destroy(Path(_id): Path<String>) -> Json<Value> {
  Json(json!({ "http_method": "DELETE" }))
}

#[cfg(test)]
mod tests {
  use profiles_core::validation::{REQUIRED, too_long};

  use super::*;

  fn body(name: Option<&str>) -> HelloBody { HelloBody { name: name.map(str::to_owned) } }

  #[test]
  fn name_rules() {
    assert_eq!(body(Some("Ada")).validated_name().unwrap(), "Ada");
    assert_eq!(body(Some("abcdefghij")).validated_name().unwrap(), "abcdefghij");
    assert_eq!(body(Some("  abcdefghij ")).validated_name().unwrap(), "abcdefghij");

    let errors = body(Some("abcdefghijk")).validated_name().unwrap_err();
    assert_eq!(errors.field("name"), Some(&[too_long(10)][..]));

    let errors = body(None).validated_name().unwrap_err();
    assert_eq!(errors.field("name"), Some(&[REQUIRED.to_owned()][..]));
  }

  #[tokio::test]
  async fn names_accumulate() {
    let names = HelloNames::default();
    names.push("a".into()).await;
    names.clone().push("b".into()).await;
    assert_eq!(names.snapshot().await, ["a", "b"]);
  }
}
