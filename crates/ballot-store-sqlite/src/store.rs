//! [`SqliteStore`]: the SQLite implementation of [`VoteStore`].

use std::path::Path;

use ballot_core::{
  ballot::{Ballot, CastVote},
  event::{NewVoteEvent, VoteEvent},
  registry::{Candidate, Group, NewCandidate, NewGroup, NewVoter, Voter},
  store::VoteStore,
  tally::VoteResult,
};
use chrono::Utc;
use rusqlite::Connection;

use crate::{Result, queries, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A voting store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All clones
/// share one connection thread, so operations are applied one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` against the connection outside any explicit transaction.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside one transaction: committed if `f` succeeds, rolled back
  /// (on drop) on every error path.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(in_transaction(conn, f)))
      .await?
  }
}

fn in_transaction<T>(
  conn: &mut Connection,
  f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
  let tx = conn.transaction()?;
  let value = f(&tx)?;
  tx.commit()?;
  Ok(value)
}

// ─── VoteStore impl ──────────────────────────────────────────────────────────

impl VoteStore for SqliteStore {
  type Error = crate::Error;

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, input: NewGroup) -> Result<Group> {
    let input = input.normalized()?;
    let group = self.transact(move |conn| queries::insert_group(conn, &input)).await?;
    tracing::debug!(group_id = group.group_id, "group created");
    Ok(group)
  }

  async fn get_group(&self, group_id: i64) -> Result<Option<Group>> {
    self.read(move |conn| queries::get_group(conn, group_id)).await
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    self.read(queries::list_groups).await
  }

  // ── Candidates ────────────────────────────────────────────────────────────

  async fn add_candidate(&self, input: NewCandidate) -> Result<Candidate> {
    let input = input.normalized()?;
    let candidate = self
      .transact(move |conn| queries::insert_candidate(conn, &input))
      .await?;
    tracing::debug!(
      candidate_id = candidate.candidate_id,
      group_id = candidate.group_id,
      "candidate created"
    );
    Ok(candidate)
  }

  async fn get_candidate(&self, candidate_id: i64) -> Result<Option<Candidate>> {
    self.read(move |conn| queries::get_candidate(conn, candidate_id)).await
  }

  async fn list_candidates(&self, group_id: Option<i64>) -> Result<Vec<Candidate>> {
    self.read(move |conn| queries::list_candidates(conn, group_id)).await
  }

  // ── Voters ────────────────────────────────────────────────────────────────

  async fn add_voter(&self, input: NewVoter) -> Result<Voter> {
    let input = input.normalized()?;
    let voter = self.transact(move |conn| queries::insert_voter(conn, &input)).await?;
    tracing::debug!(voter_id = voter.voter_id, group_id = voter.group_id, "voter created");
    Ok(voter)
  }

  async fn get_voter(&self, voter_id: i64) -> Result<Option<Voter>> {
    self.read(move |conn| queries::get_voter(conn, voter_id)).await
  }

  async fn find_voter_by_phone<'a>(&'a self, phone: &'a str) -> Result<Option<Voter>> {
    let phone = phone.trim().to_owned();
    self
      .read(move |conn| queries::find_voter_by_phone(conn, &phone))
      .await
  }

  async fn import_voters(&self, voters: Vec<NewVoter>) -> Result<usize> {
    let voters = voters
      .into_iter()
      .map(NewVoter::normalized)
      .collect::<ballot_core::Result<Vec<_>>>()?;

    match self.transact(move |conn| queries::import_voters(conn, &voters)).await {
      Ok(created) => {
        tracing::info!(created, "voter roll imported");
        Ok(created)
      }
      Err(e) => {
        tracing::warn!(error = %e, "voter roll rejected");
        Err(e)
      }
    }
  }

  // ── Vote events ───────────────────────────────────────────────────────────

  async fn create_vote_event(&self, input: NewVoteEvent) -> Result<VoteEvent> {
    let input = input.normalized()?;
    let now = Utc::now();
    let event = self
      .transact(move |conn| queries::insert_vote_event(conn, &input, now))
      .await?;
    tracing::info!(
      vote_event_id = event.vote_event_id,
      candidates = event.candidate_ids.len(),
      "vote event created"
    );
    Ok(event)
  }

  async fn get_vote_event(&self, vote_event_id: i64) -> Result<Option<VoteEvent>> {
    self
      .read(move |conn| queries::get_vote_event(conn, vote_event_id))
      .await
  }

  async fn list_vote_events(&self) -> Result<Vec<VoteEvent>> {
    self.read(queries::list_vote_events).await
  }

  // ── Casting ───────────────────────────────────────────────────────────────

  async fn cast_vote(&self, vote_event_id: i64, ballot: Ballot) -> Result<CastVote> {
    let ballot = Ballot {
      voter_phone: ballot.voter_phone.trim().to_owned(),
      ..ballot
    };
    let now = Utc::now();

    match self
      .transact(move |conn| queries::cast_vote(conn, vote_event_id, &ballot, now))
      .await
    {
      Ok(cast) => {
        tracing::info!(
          cast_vote_id = cast.cast_vote_id,
          vote_event_id,
          voter_id = cast.voter_id,
          "vote cast"
        );
        Ok(cast)
      }
      Err(e) => {
        tracing::warn!(vote_event_id, error = %e, "vote rejected");
        Err(e)
      }
    }
  }

  // ── Tallies ───────────────────────────────────────────────────────────────

  async fn get_results(&self, vote_event_id: i64, group_id: Option<i64>) -> Result<VoteResult> {
    let result = self
      .read(move |conn| queries::results(conn, vote_event_id, group_id))
      .await?;
    tracing::debug!(vote_event_id, ?group_id, total = result.total_votes, "results tallied");
    Ok(result)
  }

  async fn combine_results<'a>(
    &'a self,
    vote_event_ids: &'a [i64],
    group_id: Option<i64>,
  ) -> Result<VoteResult> {
    let ids = vote_event_ids.to_vec();
    // One transaction so every event and count comes from the same snapshot.
    let result = self
      .transact(move |conn| queries::combined_results(conn, &ids, group_id))
      .await?;
    tracing::debug!(
      ?vote_event_ids,
      ?group_id,
      total = result.total_votes,
      "combined results tallied"
    );
    Ok(result)
  }
}
