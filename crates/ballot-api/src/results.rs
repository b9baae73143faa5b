//! Handler for `/results/combined`.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
};
use ballot_core::{store::VoteStore, tally::VoteResult};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::ApiQuery,
};

#[derive(Debug, Deserialize)]
pub struct CombinedParams {
  /// Comma-separated vote event ids, e.g. `1,2,3`.
  pub ids:      String,
  pub group_id: Option<i64>,
}

fn parse_ids(raw: &str) -> Result<Vec<i64>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid vote event id: {s:?}")))
    })
    .collect()
}

/// `GET /results/combined?ids=<id>,<id>[,...][&group_id=<id>]`
pub async fn combined<S: VoteStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<CombinedParams>,
) -> Result<Json<VoteResult>, ApiError> {
  let ids = parse_ids(&params.ids)?;
  let result = store
    .combine_results(&ids, params.group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(result))
}
