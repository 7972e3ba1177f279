//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use profiles_core::{
  error::AsCoreError,
  validation::{NON_FIELD_ERRORS, ValidationErrors},
};
use serde_json::json;
use thiserror::Error;

const DUPLICATE_EMAIL: &str = "user profile with this email already exists.";
const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// Bad credentials at login. Never says which field was wrong.
  #[error("unable to log in with provided credentials")]
  InvalidCredentials,

  /// A mutating request without a valid token.
  #[error("authentication credentials were not provided or are invalid")]
  Unauthenticated,

  #[error("you do not have permission to perform this action")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  UnsupportedMediaType(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain failure behind it.
  pub fn store<E>(e: E) -> Self
  where
    E: AsCoreError + std::error::Error + Send + Sync + 'static,
  {
    match e.as_core() {
      Some(core) => core.clone().into(),
      None => Self::Store(Box::new(e)),
    }
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      JsonRejection::MissingJsonContentType(r) => Self::UnsupportedMediaType(r.body_text()),
      JsonRejection::JsonSyntaxError(r) => Self::Validation(ValidationErrors::single(
        NON_FIELD_ERRORS,
        format!("JSON parse error - {}", r.body_text()),
      )),
      other => {
        Self::Validation(ValidationErrors::single(NON_FIELD_ERRORS, other.body_text()))
      }
    }
  }
}

impl From<profiles_core::Error> for ApiError {
  fn from(e: profiles_core::Error) -> Self {
    use profiles_core::Error as E;
    match e {
      E::Validation(errors) => Self::Validation(errors),
      E::DuplicateEmail(_) => {
        Self::Validation(ValidationErrors::single("email", DUPLICATE_EMAIL))
      }
      E::InvalidCredentials => Self::InvalidCredentials,
      E::Forbidden { .. } => Self::Forbidden,
      E::AccountNotFound(id) => Self::NotFound(format!("account {id} not found")),
      E::FeedItemNotFound(id) => Self::NotFound(format!("feed item {id} not found")),
      e @ E::Hashing(_) => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(errors) => {
        (StatusCode::BAD_REQUEST, Json(errors)).into_response()
      }
      ApiError::InvalidCredentials => (
        StatusCode::BAD_REQUEST,
        Json(json!({ NON_FIELD_ERRORS: [BAD_CREDENTIALS] })),
      )
        .into_response(),
      ApiError::Unauthenticated => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": self.to_string() })),
        )
          .into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        res
      }
      ApiError::Forbidden => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": self.to_string() })))
          .into_response()
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::UnsupportedMediaType(m) => {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": e.to_string() })),
        )
          .into_response()
      }
    }
  }
}
