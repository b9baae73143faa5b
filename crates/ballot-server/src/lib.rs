//! HTTP server assembly for ballot.
//!
//! Loads [`ServerConfig`], and mounts the [`ballot_api`] router under
//! `/api/v1` with request tracing. The binary in `main.rs` wires these to a
//! SQLite store and a TCP listener.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use ballot_core::store::VoteStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Prefix for environment overrides, e.g. `BALLOT_PORT=9000`.
pub const ENV_PREFIX: &str = "BALLOT";

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  /// Read `path` (if it exists), then `BALLOT_*` variables, over the
  /// built-in defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8000)?
      .set_default("store_path", "ballot.db")?
      .add_source(config::File::from(path.as_ref()).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

async fn welcome() -> Json<Value> { Json(json!({ "message": "Welcome to the Voting API" })) }

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: VoteStore + 'static,
{
  Router::new()
    .route("/", get(welcome))
    .nest("/api/v1", ballot_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
