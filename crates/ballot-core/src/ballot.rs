//! Cast votes.
//!
//! Per (voter, vote event) pair the state is either not-voted or voted, and
//! voted is terminal: cast votes are append-only and at most one exists per
//! pair (enforced by a UNIQUE constraint in the store).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, event::VoteEvent};

/// A voter's choice, as submitted. The voter is identified by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ballot {
  pub voter_phone:  String,
  pub candidate_id: i64,
}

impl Ballot {
  pub fn new(voter_phone: impl Into<String>, candidate_id: i64) -> Self {
    Self { voter_phone: voter_phone.into(), candidate_id }
  }
}

/// One voter's recorded choice for one candidate within one vote event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
  pub cast_vote_id:  i64,
  pub vote_event_id: i64,
  pub voter_id:      i64,
  pub candidate_id:  i64,
  /// Server-assigned at insertion.
  pub cast_at:       DateTime<Utc>,
}

/// Reject a ballot whose candidate is not on the event's slate.
pub fn ensure_on_slate(event: &VoteEvent, candidate_id: i64) -> Result<()> {
  if event.has_candidate(candidate_id) {
    Ok(())
  } else {
    Err(Error::CandidateNotInEvent {
      candidate_id,
      vote_event_id: event.vote_event_id,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn off_slate_candidate_rejected() {
    let event = VoteEvent {
      vote_event_id: 7,
      title:         "Chair".into(),
      created_at:    Utc::now(),
      candidate_ids: vec![1, 2],
    };
    assert!(ensure_on_slate(&event, 2).is_ok());
    let err = ensure_on_slate(&event, 3).unwrap_err();
    assert!(matches!(
      err,
      Error::CandidateNotInEvent { candidate_id: 3, vote_event_id: 7 }
    ));
  }
}
