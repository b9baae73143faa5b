//! JSON REST API for ballot.
//!
//! Exposes an axum [`Router`] backed by any [`ballot_core::store::VoteStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", ballot_api::api_router(store.clone()))
//! ```

pub mod candidates;
pub mod error;
pub mod extract;
pub mod groups;
pub mod results;
pub mod voters;
pub mod votes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ballot_core::store::VoteStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: VoteStore + 'static,
{
  Router::new()
    // Registry
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route("/groups/{id}", get(groups::get_one::<S>))
    .route("/candidates", get(candidates::list::<S>).post(candidates::create::<S>))
    .route("/candidates/{id}", get(candidates::get_one::<S>))
    .route("/voters", post(voters::create::<S>))
    .route("/voters/import", post(voters::import::<S>))
    .route("/voters/{id}", get(voters::get_one::<S>))
    // Vote events
    .route("/votes", get(votes::list::<S>).post(votes::create::<S>))
    .route("/votes/{id}", get(votes::get_one::<S>))
    .route("/votes/{id}/cast", post(votes::cast::<S>))
    .route("/votes/{id}/results", get(votes::results::<S>))
    // Cross-event tallies
    .route("/results/combined", get(results::combined::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ballot_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app:          &Router,
    method:       &str,
    uri:          &str,
    content_type: &str,
    body:         String,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, content_type)
      .body(Body::from(body))
      .unwrap();
    let resp   = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value  = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, "application/json", String::new()).await
  }

  async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, "application/json", body.to_string()).await
  }

  /// Group 1, candidates A and B, event "E" over both, voter "555".
  async fn seeded() -> (Router, i64, i64, i64, i64) {
    let app = app().await;
    let (_, g) = post_json(&app, "/groups", json!({ "name": "G1" })).await;
    let group = g["group_id"].as_i64().unwrap();
    let (_, a) = post_json(&app, "/candidates", json!({ "name": "A", "group_id": group })).await;
    let (_, b) = post_json(&app, "/candidates", json!({ "name": "B", "group_id": group })).await;
    let a = a["candidate_id"].as_i64().unwrap();
    let b = b["candidate_id"].as_i64().unwrap();
    let (status, e) = post_json(&app, "/votes", json!({ "title": "E", "candidate_ids": [a, b] })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json(
      &app,
      "/voters",
      json!({ "name": "Alice", "phone": "555", "group_id": group }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (app, group, a, b, e["vote_event_id"].as_i64().unwrap())
  }

  // ── Registry ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_group() {
    let app = app().await;
    let (status, body) = post_json(&app, "/groups", json!({ "name": "North" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["group_id"].as_i64().unwrap();

    let (status, body) = get_json(&app, &format!("/groups/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "North");

    let (status, body) = get_json(&app, "/groups").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn missing_entities_are_404() {
    let app = app().await;
    for uri in ["/groups/9", "/candidates/9", "/voters/9", "/votes/9", "/votes/9/results"] {
      let (status, body) = get_json(&app, uri).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
      assert!(body["error"].is_string(), "{uri}: {body}");
    }

    let (_, body) = get_json(&app, "/voters/9").await;
    assert_eq!(body["error"], "voter not found: id 9");
  }

  #[tokio::test]
  async fn malformed_input_is_json_400() {
    let app = app().await;

    let (status, body) =
      post_json(&app, "/votes", json!({ "title": "E", "candidate_ids": "abc" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = send(&app, "POST", "/groups", "application/json", "{".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    for uri in ["/votes/abc", "/candidates?group_id=north", "/results/combined"] {
      let (status, body) = get_json(&app, uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert!(body["error"].is_string(), "{uri}: {body}");
    }
  }

  #[tokio::test]
  async fn blank_group_name_is_400() {
    let app = app().await;
    let (status, _) = post_json(&app, "/groups", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn candidates_filter_by_group() {
    let (app, group, ..) = seeded().await;
    let (_, other) = post_json(&app, "/groups", json!({ "name": "G2" })).await;
    let other = other["group_id"].as_i64().unwrap();
    post_json(&app, "/candidates", json!({ "name": "C", "group_id": other })).await;

    let (_, all) = get_json(&app, "/candidates").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    let (_, filtered) = get_json(&app, &format!("/candidates?group_id={group}")).await;
    assert_eq!(filtered.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn duplicate_phone_is_409() {
    let (app, group, ..) = seeded().await;
    let (status, body) = post_json(
      &app,
      "/voters",
      json!({ "name": "Mallory", "phone": "555", "group_id": group }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("555"));
  }

  // ── Import ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn import_reports_created_and_skipped() {
    let (app, group, ..) = seeded().await;
    let csv = format!("name,phone,group_id\nBob,600,{group}\nbroken row\n,601,{group}\n");
    let (status, body) = send(&app, "POST", "/voters/import", "text/csv", csv).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 2);
    assert_eq!(body["skipped"][0]["line"], 3);
  }

  #[tokio::test]
  async fn import_with_known_phone_creates_nothing() {
    let (app, group, _, _, event) = seeded().await;
    let csv = format!("Bob,600,{group}\nAlice again,555,{group}\n");
    let (status, _) = send(&app, "POST", "/voters/import", "text/csv", csv).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Bob was rolled back with the rest of the batch.
    let (status, _) = post_json(
      &app,
      &format!("/votes/{event}/cast"),
      json!({ "voter_phone": "600", "candidate_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn empty_import_creates_zero() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/voters/import", "text/csv", "name,phone,group_id\n".into()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 0);
  }

  // ── Vote events ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_candidate_in_slate_is_400() {
    let (app, _, a, ..) = seeded().await;
    let (status, body) =
      post_json(&app, "/votes", json!({ "title": "Bad", "candidate_ids": [a, 999] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid candidate ids");

    let (_, events) = get_json(&app, "/votes").await;
    assert_eq!(events.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn cast_then_results() {
    let (app, _, a, b, event) = seeded().await;

    let (status, cast) = post_json(
      &app,
      &format!("/votes/{event}/cast"),
      json!({ "voter_phone": "555", "candidate_id": a }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cast["candidate_id"], a);

    let (status, _) = post_json(
      &app,
      &format!("/votes/{event}/cast"),
      json!({ "voter_phone": "555", "candidate_id": b }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, result) = get_json(&app, &format!("/votes/{event}/results")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["total_votes"], 1);
    assert_eq!(result["breakdown"], json!([{ "candidate_id": a, "candidate_name": "A", "votes": 1 }]));
  }

  #[tokio::test]
  async fn cast_by_unknown_phone_is_404() {
    let (app, _, a, _, event) = seeded().await;
    let (status, _) = post_json(
      &app,
      &format!("/votes/{event}/cast"),
      json!({ "voter_phone": "000", "candidate_id": a }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn cast_for_off_slate_candidate_is_400() {
    let (app, group, ..) = seeded().await;
    let (_, c) = post_json(&app, "/candidates", json!({ "name": "C", "group_id": group })).await;
    let (_, event) = get_json(&app, "/votes").await;
    let event = event[0]["vote_event_id"].as_i64().unwrap();

    let (status, body) = post_json(
      &app,
      &format!("/votes/{event}/cast"),
      json!({ "voter_phone": "555", "candidate_id": c["candidate_id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("candidate not in event"));
  }

  // ── Combined results ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn combined_results_sum_events() {
    let (app, _, a, b, first) = seeded().await;
    let (_, second) = post_json(&app, "/votes", json!({ "title": "F", "candidate_ids": [b, a] })).await;
    let second = second["vote_event_id"].as_i64().unwrap();

    for event in [first, second] {
      post_json(
        &app,
        &format!("/votes/{event}/cast"),
        json!({ "voter_phone": "555", "candidate_id": b }),
      )
      .await;
    }

    let (status, result) = get_json(&app, &format!("/results/combined?ids={first},{second}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(result.get("vote_event_id").is_none(), "{result}");
    assert_eq!(result["title"], "E + F");
    assert_eq!(result["total_votes"], 2);
    assert_eq!(result["breakdown"][0]["candidate_id"], b);
  }

  #[tokio::test]
  async fn combined_results_validate_input() {
    let (app, group, a, _, first) = seeded().await;
    let (_, solo) = post_json(&app, "/votes", json!({ "title": "Solo", "candidate_ids": [a] })).await;
    let solo = solo["vote_event_id"].as_i64().unwrap();

    let cases = [
      format!("/results/combined?ids={first}"),
      format!("/results/combined?ids={first},{solo}"),
      format!("/results/combined?ids={first},404"),
      "/results/combined?ids=1,x".to_owned(),
      format!("/results/combined?ids={first},{solo}&group_id={group}"),
    ];
    for uri in cases {
      let (status, _) = get_json(&app, &uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
  }
}
