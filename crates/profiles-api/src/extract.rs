//! Request extractors whose failures use the API's error shapes.
//!
//! axum's own `Json` and `Path` reject with plain-text bodies. These wrappers
//! report bad bodies as field-keyed validation errors and unparseable ids as
//! not-found.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Path, Request},
  http::request::Parts,
};
use profiles_core::validation::{INVALID_STRING, NON_FIELD_ERRORS, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

// ─── JSON body ────────────────────────────────────────────────────────────────

/// A JSON object body decoded into `T`.
///
/// A field of the wrong type is reported against that field; a body that is
/// not an object is reported under `non_field_errors`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<Value>::from_request(req, state).await?;
    Ok(Self(decode(value)?))
  }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ValidationErrors> {
  let map = match value {
    Value::Object(map) => map,
    other => {
      return Err(ValidationErrors::single(
        NON_FIELD_ERRORS,
        format!("Invalid data. Expected a dictionary, but got {}.", kind(&other)),
      ));
    }
  };

  let err = match serde_json::from_value(Value::Object(map.clone())) {
    Ok(decoded) => return Ok(decoded),
    Err(err) => err,
  };

  // Every input field is optional, so a field decodes on its own iff its
  // value has the right type.
  let mut errors = ValidationErrors::new();
  for (key, field) in &map {
    let alone = Value::Object(Map::from_iter([(key.clone(), field.clone())]));
    if serde_json::from_value::<T>(alone).is_err() {
      errors.add(key, INVALID_STRING);
    }
  }
  if errors.is_empty() {
    errors.add(NON_FIELD_ERRORS, err.to_string());
  }
  Err(errors)
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "list",
    Value::Object(_) => "dictionary",
  }
}

// ─── Record id ────────────────────────────────────────────────────────────────

/// The `{id}` path segment of a record route. Anything that is not a UUID
/// cannot name a record, so it is a 404.
pub struct RecordId(pub Uuid);

impl<S> FromRequestParts<S> for RecordId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
      .await
      .map_err(|e| ApiError::NotFound(e.body_text()))?;
    raw
      .parse()
      .map(Self)
      .map_err(|_| ApiError::NotFound(format!("no record with id {raw:?}")))
  }
}
