//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ballot_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// Body text for every 500; store internals are only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store failure onto a response class by its [`ErrorKind`].
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.kind() {
      ErrorKind::NotFound => Self::NotFound(e.to_string()),
      ErrorKind::Conflict => Self::Conflict(e.to_string()),
      ErrorKind::Validation => Self::BadRequest(e.to_string()),
      ErrorKind::Store => Self::Store(Box::new(e)),
    }
  }
}

impl From<ballot_core::Error> for ApiError {
  fn from(e: ballot_core::Error) -> Self { Self::from_store(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_by_kind() {
    let cases = [
      (ballot_core::Error::GroupNotFound(1), StatusCode::NOT_FOUND),
      (ballot_core::Error::DuplicatePhone("555".into()), StatusCode::CONFLICT),
      (ballot_core::Error::InvalidCandidateIds, StatusCode::BAD_REQUEST),
      (ballot_core::Error::TooFewEvents(1), StatusCode::BAD_REQUEST),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }

  #[tokio::test]
  async fn store_failure_is_opaque_500() {
    let err = ballot_store_sqlite::Error::DateParse("bad timestamp in cast_votes".into());
    let resp = ApiError::from_store(err).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "internal error" }));
  }
}
