//! Handlers for `/voters` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/voters` | Body: `{"name":"Alice","phone":"555-0101","group_id":1}`; 409 on a duplicate phone |
//! | `GET`  | `/voters/{id}` | 404 if not found |
//! | `POST` | `/voters/import` | Body: CSV `name,phone,group_id`; all-or-nothing |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{
  Error as CoreError,
  registry::{NewVoter, Voter},
  store::VoteStore,
};
use serde::Serialize;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /voters`: returns 201 + the stored voter.
pub async fn create<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewVoter>,
) -> Result<impl IntoResponse, ApiError> {
  let voter = store.add_voter(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(voter)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /voters/{id}`
pub async fn get_one<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Voter>, ApiError> {
  let voter = store
    .get_voter(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::VoterIdNotFound(id))?;
  Ok(Json(voter))
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImportSummary {
  pub created: usize,
  pub skipped: Vec<SkippedLine>,
}

/// A CSV row that was left out of the import.
#[derive(Debug, Serialize)]
pub struct SkippedLine {
  pub line:   usize,
  pub reason: String,
}

/// `POST /voters/import`: returns 201 + [`ImportSummary`].
///
/// Malformed rows are skipped and listed; any store-level rejection (a
/// duplicate phone, an unknown group) fails the whole import.
pub async fn import<S: VoteStore>(
  State(store): State<Arc<S>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let roll = ballot_roll::parse_bytes(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let skipped = roll
    .skipped
    .into_iter()
    .map(|row| SkippedLine { line: row.line, reason: row.reason.to_string() })
    .collect();
  let created = store
    .import_voters(roll.voters)
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(ImportSummary { created, skipped })))
}
