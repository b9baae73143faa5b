//! Vote events and their candidate slates.
//!
//! A slate is fixed when the event is created; no operation changes it
//! afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named poll with a fixed candidate slate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
  pub vote_event_id: i64,
  pub title:         String,
  /// Server-assigned at creation.
  pub created_at:    DateTime<Utc>,
  /// The slate, in ascending id order.
  pub candidate_ids: Vec<i64>,
}

impl VoteEvent {
  pub fn has_candidate(&self, candidate_id: i64) -> bool {
    self.candidate_ids.binary_search(&candidate_id).is_ok()
  }

  /// Set equality of the two slates; the order they were requested in is
  /// irrelevant.
  pub fn same_slate(&self, other: &VoteEvent) -> bool {
    let ours: BTreeSet<i64> = self.candidate_ids.iter().copied().collect();
    let theirs: BTreeSet<i64> = other.candidate_ids.iter().copied().collect();
    ours == theirs
  }
}

/// Input to [`crate::store::VoteStore::create_vote_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewVoteEvent {
  pub title:         String,
  /// Requested slate, in caller order.
  pub candidate_ids: Vec<i64>,
}

impl NewVoteEvent {
  pub fn new(title: impl Into<String>, candidate_ids: impl Into<Vec<i64>>) -> Self {
    Self { title: title.into(), candidate_ids: candidate_ids.into() }
  }

  /// Trim the title and check the request is structurally usable.
  pub fn normalized(self) -> Result<Self> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(Error::EmptyTitle);
    }
    if self.candidate_ids.is_empty() {
      return Err(Error::EmptySlate);
    }
    Ok(Self { title: title.to_owned(), candidate_ids: self.candidate_ids })
  }
}

/// Check the candidates found in the store against the requested ids.
///
/// `found` holds the distinct ids that exist. Every requested id must resolve
/// and none may repeat, so the counts must match exactly; otherwise the whole
/// event is rejected. Returns the slate in ascending order.
pub fn resolve_slate(requested: &[i64], found: &[i64]) -> Result<Vec<i64>> {
  let found: BTreeSet<i64> = found.iter().copied().collect();
  if found.len() != requested.len()
    || !requested.iter().all(|id| found.contains(id))
  {
    return Err(Error::InvalidCandidateIds);
  }
  Ok(found.into_iter().collect())
}
