//! Handlers for `/votes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/votes` | All vote events |
//! | `POST` | `/votes` | Body: `{"title":"Chair","candidate_ids":[1,2]}` |
//! | `GET`  | `/votes/{id}` | 404 if not found |
//! | `POST` | `/votes/{id}/cast` | Body: `{"voter_phone":"555","candidate_id":1}`; 409 on a second vote |
//! | `GET`  | `/votes/{id}/results` | Optional `?group_id=<id>` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{
  Error as CoreError,
  ballot::Ballot,
  event::{NewVoteEvent, VoteEvent},
  store::VoteStore,
  tally::VoteResult,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /votes`
pub async fn list<S: VoteStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<VoteEvent>>, ApiError> {
  let events = store.list_vote_events().await.map_err(ApiError::from_store)?;
  Ok(Json(events))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /votes`: returns 201 + the event with its fixed slate.
pub async fn create<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewVoteEvent>,
) -> Result<impl IntoResponse, ApiError> {
  let event = store
    .create_vote_event(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /votes/{id}`
pub async fn get_one<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<VoteEvent>, ApiError> {
  let event = store
    .get_vote_event(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::VoteEventNotFound(id))?;
  Ok(Json(event))
}

// ─── Cast ────────────────────────────────────────────────────────────────────

/// `POST /votes/{id}/cast`: returns 201 + the recorded cast vote.
pub async fn cast<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
  ApiJson(ballot): ApiJson<Ballot>,
) -> Result<impl IntoResponse, ApiError> {
  let cast = store.cast_vote(id, ballot).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(cast)))
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResultParams {
  pub group_id: Option<i64>,
}

/// `GET /votes/{id}/results[?group_id=<id>]`
pub async fn results<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
  ApiQuery(params): ApiQuery<ResultParams>,
) -> Result<Json<VoteResult>, ApiError> {
  let result = store
    .get_results(id, params.group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(result))
}
