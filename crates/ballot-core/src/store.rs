//! The `VoteStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ballot-store-sqlite`).
//! Higher layers (`ballot-api`, `ballot-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  Classify,
  ballot::{Ballot, CastVote},
  event::{NewVoteEvent, VoteEvent},
  registry::{Candidate, Group, NewCandidate, NewGroup, NewVoter, Voter},
  tally::VoteResult,
};

/// Abstraction over a voting backend.
///
/// Every method is one unit of work: writes are committed as a whole or not
/// at all. Cast votes are append-only; nothing here updates or deletes.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait VoteStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Groups ────────────────────────────────────────────────────────────

  fn add_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    group_id: i64,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  // ── Candidates ────────────────────────────────────────────────────────

  /// Fails with a not-found error if the group does not exist.
  fn add_candidate(
    &self,
    input: NewCandidate,
  ) -> impl Future<Output = Result<Candidate, Self::Error>> + Send + '_;

  fn get_candidate(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + '_;

  /// List candidates, optionally restricted to one group.
  fn list_candidates(
    &self,
    group_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  // ── Voters ────────────────────────────────────────────────────────────

  /// Fails with a conflict if the phone number is already registered.
  fn add_voter(
    &self,
    input: NewVoter,
  ) -> impl Future<Output = Result<Voter, Self::Error>> + Send + '_;

  fn get_voter(
    &self,
    voter_id: i64,
  ) -> impl Future<Output = Result<Option<Voter>, Self::Error>> + Send + '_;

  fn find_voter_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<Voter>, Self::Error>> + Send + 'a;

  /// Insert a batch of voters in one transaction and return how many were
  /// created. Any duplicate phone or unknown group rolls back the whole batch
  /// and names the offending value.
  fn import_voters(
    &self,
    voters: Vec<NewVoter>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Vote events ───────────────────────────────────────────────────────

  /// Create an event bound to a fixed slate. Every candidate id must exist
  /// and appear once; otherwise nothing is written.
  fn create_vote_event(
    &self,
    input: NewVoteEvent,
  ) -> impl Future<Output = Result<VoteEvent, Self::Error>> + Send + '_;

  fn get_vote_event(
    &self,
    vote_event_id: i64,
  ) -> impl Future<Output = Result<Option<VoteEvent>, Self::Error>> + Send + '_;

  fn list_vote_events(
    &self,
  ) -> impl Future<Output = Result<Vec<VoteEvent>, Self::Error>> + Send + '_;

  // ── Casting ───────────────────────────────────────────────────────────

  /// Record a single vote. Fails if the voter or event is unknown, if the
  /// voter has already voted in this event, or if the candidate is not on
  /// the event's slate.
  fn cast_vote(
    &self,
    vote_event_id: i64,
    ballot: Ballot,
  ) -> impl Future<Output = Result<CastVote, Self::Error>> + Send + '_;

  // ── Tallies ───────────────────────────────────────────────────────────

  /// Per-candidate counts for one event, optionally restricted to the voters
  /// of `group_id`.
  fn get_results(
    &self,
    vote_event_id: i64,
    group_id: Option<i64>,
  ) -> impl Future<Output = Result<VoteResult, Self::Error>> + Send + '_;

  /// Counts across two or more events that share an identical slate.
  fn combine_results<'a>(
    &'a self,
    vote_event_ids: &'a [i64],
    group_id: Option<i64>,
  ) -> impl Future<Output = Result<VoteResult, Self::Error>> + Send + 'a;
}
