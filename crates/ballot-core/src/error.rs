//! Error types for `ballot-core`.

use thiserror::Error;

/// Coarse classification of a failure, independent of its message text.
///
/// Transport layers map these onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced entity does not exist.
  NotFound,
  /// A uniqueness or state invariant would be violated.
  Conflict,
  /// Caller-supplied data is structurally invalid.
  Validation,
  /// The persistence layer failed for an unrelated reason.
  Store,
}

/// Anything that can report its [`ErrorKind`].
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  /// No voter is registered under this phone number.
  #[error("voter not found: {0}")]
  VoterNotFound(String),

  #[error("voter not found: id {0}")]
  VoterIdNotFound(i64),

  #[error("vote event not found: {0}")]
  VoteEventNotFound(i64),

  #[error("group not found: {0}")]
  GroupNotFound(i64),

  #[error("candidate not found: {0}")]
  CandidateNotFound(i64),

  #[error("already voted: voter {voter_id} in vote event {vote_event_id}")]
  AlreadyVoted { voter_id: i64, vote_event_id: i64 },

  #[error("phone number already registered: {0}")]
  DuplicatePhone(String),

  #[error("invalid candidate ids")]
  InvalidCandidateIds,

  #[error("candidate not in event: candidate {candidate_id} is not on the slate of vote event {vote_event_id}")]
  CandidateNotInEvent { candidate_id: i64, vote_event_id: i64 },

  #[error("at least two distinct vote events are required to combine, got {0}")]
  TooFewEvents(usize),

  #[error("vote event {0} does not exist")]
  UnknownVoteEvent(i64),

  #[error("vote event {0} has a different candidate slate")]
  SlateMismatch(i64),

  #[error("vote event title must not be empty")]
  EmptyTitle,

  #[error("vote event must name at least one candidate")]
  EmptySlate,

  #[error("name must not be empty")]
  EmptyName,

  #[error("phone number must not be empty")]
  EmptyPhone,
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::VoterNotFound(_)
      | Self::VoterIdNotFound(_)
      | Self::VoteEventNotFound(_)
      | Self::GroupNotFound(_)
      | Self::CandidateNotFound(_) => ErrorKind::NotFound,

      Self::AlreadyVoted { .. } | Self::DuplicatePhone(_) => ErrorKind::Conflict,

      Self::InvalidCandidateIds
      | Self::CandidateNotInEvent { .. }
      | Self::TooFewEvents(_)
      | Self::UnknownVoteEvent(_)
      | Self::SlateMismatch(_)
      | Self::EmptyTitle
      | Self::EmptySlate
      | Self::EmptyName
      | Self::EmptyPhone => ErrorKind::Validation,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_follow_failure_class() {
    assert_eq!(Error::VoterNotFound("555".into()).kind(), ErrorKind::NotFound);
    assert_eq!(Error::VoterIdNotFound(4).kind(), ErrorKind::NotFound);
    assert_eq!(Error::VoteEventNotFound(1).kind(), ErrorKind::NotFound);
    assert_eq!(
      Error::AlreadyVoted { voter_id: 1, vote_event_id: 2 }.kind(),
      ErrorKind::Conflict
    );
    assert_eq!(Error::DuplicatePhone("555".into()).kind(), ErrorKind::Conflict);
    assert_eq!(Error::InvalidCandidateIds.kind(), ErrorKind::Validation);
    assert_eq!(Error::UnknownVoteEvent(9).kind(), ErrorKind::Validation);
    assert_eq!(Error::SlateMismatch(3).kind(), ErrorKind::Validation);
  }

  #[test]
  fn messages_lead_with_outcome() {
    assert!(Error::VoterNotFound("555".into()).to_string().starts_with("voter not found"));
    assert!(
      Error::AlreadyVoted { voter_id: 1, vote_event_id: 2 }
        .to_string()
        .starts_with("already voted")
    );
    assert_eq!(Error::InvalidCandidateIds.to_string(), "invalid candidate ids");
  }
}
