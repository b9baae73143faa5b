//! Handlers for `/groups` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups` | All groups, in creation order |
//! | `POST` | `/groups` | Body: `{"name":"North"}` |
//! | `GET`  | `/groups/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{
  Error as CoreError,
  registry::{Group, NewGroup},
  store::VoteStore,
};

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /groups`
pub async fn list<S: VoteStore>(State(store): State<Arc<S>>) -> Result<Json<Vec<Group>>, ApiError> {
  let groups = store.list_groups().await.map_err(ApiError::from_store)?;
  Ok(Json(groups))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /groups`: returns 201 + the stored group.
pub async fn create<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewGroup>,
) -> Result<impl IntoResponse, ApiError> {
  let group = store.add_group(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(group)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /groups/{id}`
pub async fn get_one<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Group>, ApiError> {
  let group = store
    .get_group(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::GroupNotFound(id))?;
  Ok(Json(group))
}
