//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Ids are native INTEGER columns. Timestamps are stored as RFC 3339 strings,
//! so rows that carry one are first read into a `Raw*` struct and decoded
//! outside the row closure.

use ballot_core::event::VoteEvent;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `vote_events` row; the slate is read separately.
pub struct RawVoteEvent {
  pub vote_event_id: i64,
  pub title:         String,
  pub created_at:    String,
}

impl RawVoteEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vote_event_id: row.get(0)?,
      title:         row.get(1)?,
      created_at:    row.get(2)?,
    })
  }

  pub fn into_event(self, candidate_ids: Vec<i64>) -> Result<VoteEvent> {
    Ok(VoteEvent {
      vote_event_id: self.vote_event_id,
      title:         self.title,
      created_at:    decode_dt(&self.created_at)?,
      candidate_ids,
    })
  }
}

// ─── Placeholders ────────────────────────────────────────────────────────────

/// `?, ?, ?` for an `IN (...)` list of `n` parameters.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }
