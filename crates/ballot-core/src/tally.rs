//! Result tallies: the computed read model over cast votes.
//!
//! Counting happens in the store; this module owns the rules every backend
//! shares: which events may be combined, how a breakdown is ordered, and how
//! the result is titled.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, event::VoteEvent};

/// Separator between constituent titles of a combined result.
pub const COMBINED_TITLE_SEPARATOR: &str = " + ";

/// Votes received by one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
  pub candidate_id:   i64,
  pub candidate_name: String,
  pub votes:          u64,
}

/// Tallied results for one vote event, or for several combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
  /// `None` for a combined result, which represents no single event.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vote_event_id: Option<i64>,
  pub title:         String,
  pub total_votes:   u64,
  /// Only candidates with at least one vote; see [`rank`] for the order.
  pub breakdown:     Vec<CandidateTally>,
}

impl VoteResult {
  /// Build the result for a single event from per-candidate counts.
  pub fn for_event(event: &VoteEvent, counts: Vec<CandidateTally>) -> Self {
    Self::build(Some(event.vote_event_id), event.title.clone(), counts)
  }

  /// Build a combined result. `events` must already have passed
  /// [`ensure_same_slate`].
  pub fn combined(events: &[VoteEvent], counts: Vec<CandidateTally>) -> Self {
    Self::build(None, combined_title(events), counts)
  }

  fn build(vote_event_id: Option<i64>, title: String, counts: Vec<CandidateTally>) -> Self {
    let mut breakdown: Vec<CandidateTally> =
      counts.into_iter().filter(|t| t.votes > 0).collect();
    rank(&mut breakdown);
    let total_votes = breakdown.iter().map(|t| t.votes).sum();
    Self { vote_event_id, title, total_votes, breakdown }
  }
}

/// Order a breakdown by vote count, highest first; equal counts fall back to
/// ascending candidate id so results are reproducible.
pub fn rank(breakdown: &mut [CandidateTally]) {
  breakdown.sort_by(|a, b| {
    b.votes
      .cmp(&a.votes)
      .then_with(|| a.candidate_id.cmp(&b.candidate_id))
  });
}

/// Collapse repeated ids (keeping first-seen order) and require at least two.
pub fn distinct_event_ids(ids: &[i64]) -> Result<Vec<i64>> {
  let mut seen = HashSet::new();
  let distinct: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
  if distinct.len() < 2 {
    return Err(Error::TooFewEvents(distinct.len()));
  }
  Ok(distinct)
}

/// Every event must carry the same slate (as a set) as the first one.
/// The first event that differs is named in the error.
pub fn ensure_same_slate(events: &[VoteEvent]) -> Result<()> {
  let Some((first, rest)) = events.split_first() else {
    return Err(Error::TooFewEvents(0));
  };
  match rest.iter().find(|ev| !ev.same_slate(first)) {
    Some(mismatch) => Err(Error::SlateMismatch(mismatch.vote_event_id)),
    None => Ok(()),
  }
}

/// Constituent titles joined in the order the events were requested.
pub fn combined_title(events: &[VoteEvent]) -> String {
  events
    .iter()
    .map(|ev| ev.title.as_str())
    .collect::<Vec<_>>()
    .join(COMBINED_TITLE_SEPARATOR)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn event(id: i64, title: &str, slate: &[i64]) -> VoteEvent {
    VoteEvent {
      vote_event_id: id,
      title:         title.into(),
      created_at:    Utc::now(),
      candidate_ids: slate.to_vec(),
    }
  }

  fn tally(candidate_id: i64, votes: u64) -> CandidateTally {
    CandidateTally {
      candidate_id,
      candidate_name: format!("candidate {candidate_id}"),
      votes,
    }
  }

  #[test]
  fn rank_by_votes_then_id() {
    let mut b = vec![tally(3, 2), tally(1, 5), tally(2, 2), tally(4, 7)];
    rank(&mut b);
    let order: Vec<i64> = b.iter().map(|t| t.candidate_id).collect();
    assert_eq!(order, vec![4, 1, 2, 3]);
  }

  #[test]
  fn result_totals_and_drops_zero_rows() {
    let ev = event(1, "Chair", &[1, 2, 3]);
    let result = VoteResult::for_event(&ev, vec![tally(1, 2), tally(2, 0), tally(3, 4)]);
    assert_eq!(result.vote_event_id, Some(1));
    assert_eq!(result.total_votes, 6);
    assert_eq!(result.breakdown.len(), 2);
    assert_eq!(result.breakdown[0].candidate_id, 3);
  }

  #[test]
  fn combined_result_has_no_event_id() {
    let events = [event(1, "Morning", &[1, 2]), event(2, "Evening", &[2, 1])];
    let result = VoteResult::combined(&events, vec![tally(1, 3)]);
    assert_eq!(result.vote_event_id, None);
    assert_eq!(result.title, "Morning + Evening");
    assert_eq!(result.total_votes, 3);
  }

  #[test]
  fn distinct_ids_collapse_repeats() {
    assert_eq!(distinct_event_ids(&[4, 2, 4, 9]).unwrap(), vec![4, 2, 9]);
    assert!(matches!(
      distinct_event_ids(&[4, 4]).unwrap_err(),
      Error::TooFewEvents(1)
    ));
    assert!(matches!(distinct_event_ids(&[]).unwrap_err(), Error::TooFewEvents(0)));
  }

  #[test]
  fn slate_mismatch_names_first_offender() {
    let events = [
      event(1, "a", &[1, 2]),
      event(2, "b", &[2, 1]),
      event(3, "c", &[1, 3]),
      event(4, "d", &[5]),
    ];
    assert!(matches!(ensure_same_slate(&events).unwrap_err(), Error::SlateMismatch(3)));
    assert!(ensure_same_slate(&events[..2]).is_ok());
  }

  #[test]
  fn combined_result_omits_event_id() {
    let events = [event(1, "a", &[1]), event(2, "b", &[1])];
    let json = serde_json::to_value(VoteResult::combined(&events, vec![tally(1, 2)])).unwrap();
    assert!(json.get("vote_event_id").is_none(), "{json}");

    let single = serde_json::to_value(VoteResult::for_event(&events[0], Vec::new())).unwrap();
    assert_eq!(single["vote_event_id"], 1);
  }

  #[test]
  fn result_serialises_breakdown() {
    let ev = event(1, "Chair", &[1]);
    let json = serde_json::to_value(VoteResult::for_event(&ev, vec![tally(1, 1)])).unwrap();
    assert_eq!(json["total_votes"], 1);
    assert_eq!(json["breakdown"][0]["candidate_id"], 1);
    assert_eq!(json["breakdown"][0]["votes"], 1);
  }
}
