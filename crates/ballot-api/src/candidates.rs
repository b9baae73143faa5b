//! Handlers for `/candidates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/candidates` | Optional `?group_id=<id>` |
//! | `POST` | `/candidates` | Body: `{"name":"Ada","group_id":1}`; 404 if the group is unknown |
//! | `GET`  | `/candidates/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{
  Error as CoreError,
  registry::{Candidate, NewCandidate},
  store::VoteStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub group_id: Option<i64>,
}

/// `GET /candidates[?group_id=<id>]`
pub async fn list<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
  let candidates = store
    .list_candidates(params.group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(candidates))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /candidates`: returns 201 + the stored candidate.
pub async fn create<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewCandidate>,
) -> Result<impl IntoResponse, ApiError> {
  let candidate = store.add_candidate(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(candidate)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /candidates/{id}`
pub async fn get_one<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Candidate>, ApiError> {
  let candidate = store
    .get_candidate(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::CandidateNotFound(id))?;
  Ok(Json(candidate))
}
