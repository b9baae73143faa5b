//! Synchronous SQL run on the connection thread.
//!
//! Every function takes a plain [`Connection`]; callers in [`crate::store`]
//! hand in the open [`rusqlite::Transaction`] (which derefs to one) so that a
//! whole operation commits or rolls back together. Domain rules from
//! `ballot-core` are applied here, between the reads and the writes they
//! guard.

use ballot_core::{
  Error as CoreError,
  ballot::{Ballot, CastVote, ensure_on_slate},
  event::{NewVoteEvent, VoteEvent, resolve_slate},
  registry::{Candidate, Group, NewCandidate, NewGroup, NewVoter, Voter},
  tally::{CandidateTally, VoteResult, distinct_event_ids, ensure_same_slate},
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use crate::{
  Result,
  encode::{RawVoteEvent, encode_dt, placeholders},
};

// Extended result codes (sqlite3.h); rusqlite enables extended codes on open.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
  matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code)
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn group_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
  Ok(Group { group_id: row.get(0)?, name: row.get(1)? })
}

fn candidate_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Candidate> {
  Ok(Candidate {
    candidate_id: row.get(0)?,
    name:         row.get(1)?,
    group_id:     row.get(2)?,
  })
}

fn voter_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Voter> {
  Ok(Voter {
    voter_id: row.get(0)?,
    name:     row.get(1)?,
    phone:    row.get(2)?,
    group_id: row.get(3)?,
  })
}

// ─── Groups ──────────────────────────────────────────────────────────────────

pub fn insert_group(conn: &Connection, input: &NewGroup) -> Result<Group> {
  conn.execute("INSERT INTO voter_groups (name) VALUES (?1)", params![input.name])?;
  Ok(Group { group_id: conn.last_insert_rowid(), name: input.name.clone() })
}

pub fn get_group(conn: &Connection, group_id: i64) -> Result<Option<Group>> {
  Ok(
    conn
      .query_row(
        "SELECT group_id, name FROM voter_groups WHERE group_id = ?1",
        params![group_id],
        group_from_row,
      )
      .optional()?,
  )
}

pub fn list_groups(conn: &Connection) -> Result<Vec<Group>> {
  let mut stmt = conn.prepare("SELECT group_id, name FROM voter_groups ORDER BY group_id")?;
  let rows = stmt
    .query_map([], group_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn ensure_group(conn: &Connection, group_id: i64) -> Result<()> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM voter_groups WHERE group_id = ?1",
      params![group_id],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if exists {
    Ok(())
  } else {
    Err(CoreError::GroupNotFound(group_id).into())
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

pub fn insert_candidate(conn: &Connection, input: &NewCandidate) -> Result<Candidate> {
  ensure_group(conn, input.group_id)?;
  conn.execute(
    "INSERT INTO candidates (name, group_id) VALUES (?1, ?2)",
    params![input.name, input.group_id],
  )?;
  Ok(Candidate {
    candidate_id: conn.last_insert_rowid(),
    name:         input.name.clone(),
    group_id:     input.group_id,
  })
}

pub fn get_candidate(conn: &Connection, candidate_id: i64) -> Result<Option<Candidate>> {
  Ok(
    conn
      .query_row(
        "SELECT candidate_id, name, group_id FROM candidates WHERE candidate_id = ?1",
        params![candidate_id],
        candidate_from_row,
      )
      .optional()?,
  )
}

pub fn list_candidates(conn: &Connection, group_id: Option<i64>) -> Result<Vec<Candidate>> {
  let rows = if let Some(g) = group_id {
    let mut stmt = conn.prepare(
      "SELECT candidate_id, name, group_id FROM candidates
       WHERE group_id = ?1 ORDER BY candidate_id",
    )?;
    stmt
      .query_map(params![g], candidate_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  } else {
    let mut stmt =
      conn.prepare("SELECT candidate_id, name, group_id FROM candidates ORDER BY candidate_id")?;
    stmt
      .query_map([], candidate_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  Ok(rows)
}

// ─── Voters ──────────────────────────────────────────────────────────────────

pub fn insert_voter(conn: &Connection, input: &NewVoter) -> Result<Voter> {
  ensure_group(conn, input.group_id)?;
  let inserted = conn.execute(
    "INSERT INTO voters (name, phone, group_id) VALUES (?1, ?2, ?3)",
    params![input.name, input.phone, input.group_id],
  );
  match inserted {
    Ok(_) => Ok(Voter {
      voter_id: conn.last_insert_rowid(),
      name:     input.name.clone(),
      phone:    input.phone.clone(),
      group_id: input.group_id,
    }),
    Err(e) if is_constraint(&e, SQLITE_CONSTRAINT_UNIQUE) => {
      Err(CoreError::DuplicatePhone(input.phone.clone()).into())
    }
    Err(e) if is_constraint(&e, SQLITE_CONSTRAINT_FOREIGNKEY) => {
      Err(CoreError::GroupNotFound(input.group_id).into())
    }
    Err(e) => Err(e.into()),
  }
}

/// Insert every voter or fail on the first bad row. The caller's transaction
/// discards the rows already written.
pub fn import_voters(conn: &Connection, voters: &[NewVoter]) -> Result<usize> {
  for voter in voters {
    insert_voter(conn, voter)?;
  }
  Ok(voters.len())
}

pub fn get_voter(conn: &Connection, voter_id: i64) -> Result<Option<Voter>> {
  Ok(
    conn
      .query_row(
        "SELECT voter_id, name, phone, group_id FROM voters WHERE voter_id = ?1",
        params![voter_id],
        voter_from_row,
      )
      .optional()?,
  )
}

pub fn find_voter_by_phone(conn: &Connection, phone: &str) -> Result<Option<Voter>> {
  Ok(
    conn
      .query_row(
        "SELECT voter_id, name, phone, group_id FROM voters WHERE phone = ?1",
        params![phone],
        voter_from_row,
      )
      .optional()?,
  )
}

// ─── Vote events ─────────────────────────────────────────────────────────────

/// Resolve the requested slate, then write the event and its slate. Nothing is
/// written unless every candidate id resolves exactly once.
pub fn insert_vote_event(
  conn: &Connection,
  input: &NewVoteEvent,
  now: DateTime<Utc>,
) -> Result<VoteEvent> {
  let sql = format!(
    "SELECT candidate_id FROM candidates WHERE candidate_id IN ({})",
    placeholders(input.candidate_ids.len())
  );
  let mut stmt = conn.prepare(&sql)?;
  let found = stmt
    .query_map(params_from_iter(input.candidate_ids.iter()), |r| r.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let slate = resolve_slate(&input.candidate_ids, &found)?;

  conn.execute(
    "INSERT INTO vote_events (title, created_at) VALUES (?1, ?2)",
    params![input.title, encode_dt(now)],
  )?;
  let vote_event_id = conn.last_insert_rowid();

  let mut link = conn.prepare(
    "INSERT INTO vote_event_candidates (vote_event_id, candidate_id) VALUES (?1, ?2)",
  )?;
  for candidate_id in &slate {
    link.execute(params![vote_event_id, candidate_id])?;
  }

  Ok(VoteEvent {
    vote_event_id,
    title: input.title.clone(),
    created_at: now,
    candidate_ids: slate,
  })
}

fn slate_of(conn: &Connection, vote_event_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare(
    "SELECT candidate_id FROM vote_event_candidates
     WHERE vote_event_id = ?1 ORDER BY candidate_id",
  )?;
  let ids = stmt
    .query_map(params![vote_event_id], |r| r.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ids)
}

pub fn get_vote_event(conn: &Connection, vote_event_id: i64) -> Result<Option<VoteEvent>> {
  let raw = conn
    .query_row(
      "SELECT vote_event_id, title, created_at FROM vote_events WHERE vote_event_id = ?1",
      params![vote_event_id],
      RawVoteEvent::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let slate = slate_of(conn, vote_event_id)?;
      Ok(Some(raw.into_event(slate)?))
    }
    None => Ok(None),
  }
}

pub fn list_vote_events(conn: &Connection) -> Result<Vec<VoteEvent>> {
  let mut stmt = conn
    .prepare("SELECT vote_event_id, title, created_at FROM vote_events ORDER BY vote_event_id")?;
  let raws = stmt
    .query_map([], RawVoteEvent::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws
    .into_iter()
    .map(|raw| {
      let slate = slate_of(conn, raw.vote_event_id)?;
      raw.into_event(slate)
    })
    .collect()
}

// ─── Casting ─────────────────────────────────────────────────────────────────

fn has_voted(conn: &Connection, voter_id: i64, vote_event_id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM cast_votes WHERE voter_id = ?1 AND vote_event_id = ?2",
        params![voter_id, vote_event_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Validate a ballot against the voter registry and the event's slate, then
/// record it.
pub fn cast_vote(
  conn: &Connection,
  vote_event_id: i64,
  ballot: &Ballot,
  now: DateTime<Utc>,
) -> Result<CastVote> {
  let voter = find_voter_by_phone(conn, &ballot.voter_phone)?
    .ok_or_else(|| CoreError::VoterNotFound(ballot.voter_phone.clone()))?;

  let event = get_vote_event(conn, vote_event_id)?
    .ok_or(CoreError::VoteEventNotFound(vote_event_id))?;

  if has_voted(conn, voter.voter_id, vote_event_id)? {
    return Err(
      CoreError::AlreadyVoted { voter_id: voter.voter_id, vote_event_id }.into(),
    );
  }

  ensure_on_slate(&event, ballot.candidate_id)?;

  insert_cast_vote(conn, voter.voter_id, vote_event_id, ballot.candidate_id, now)
}

/// Append a cast vote. A UNIQUE violation on (voter, event) means another
/// vote got there first and is reported as `AlreadyVoted`.
pub fn insert_cast_vote(
  conn: &Connection,
  voter_id: i64,
  vote_event_id: i64,
  candidate_id: i64,
  now: DateTime<Utc>,
) -> Result<CastVote> {
  let inserted = conn.execute(
    "INSERT INTO cast_votes (cast_at, voter_id, vote_event_id, candidate_id)
     VALUES (?1, ?2, ?3, ?4)",
    params![encode_dt(now), voter_id, vote_event_id, candidate_id],
  );

  match inserted {
    Ok(_) => Ok(CastVote {
      cast_vote_id: conn.last_insert_rowid(),
      vote_event_id,
      voter_id,
      candidate_id,
      cast_at: now,
    }),
    Err(e) if is_constraint(&e, SQLITE_CONSTRAINT_UNIQUE) => {
      Err(CoreError::AlreadyVoted { voter_id, vote_event_id }.into())
    }
    Err(e) => Err(e.into()),
  }
}

// ─── Tallies ─────────────────────────────────────────────────────────────────

/// Per-candidate counts over the cast votes of `vote_event_ids`, optionally
/// restricted to voters in `group_id`. Candidates without votes produce no
/// row.
fn tally(
  conn: &Connection,
  vote_event_ids: &[i64],
  group_id: Option<i64>,
) -> Result<Vec<CandidateTally>> {
  let group_clause = if group_id.is_some() { "AND v.group_id = ?" } else { "" };
  let sql = format!(
    "SELECT c.candidate_id, c.name, COUNT(*) AS votes
     FROM cast_votes cv
     JOIN candidates c ON c.candidate_id = cv.candidate_id
     JOIN voters     v ON v.voter_id     = cv.voter_id
     WHERE cv.vote_event_id IN ({})
       {group_clause}
     GROUP BY c.candidate_id, c.name",
    placeholders(vote_event_ids.len())
  );
  let bound: Vec<i64> = vote_event_ids.iter().copied().chain(group_id).collect();

  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params_from_iter(bound), |row| {
      let votes: i64 = row.get(2)?;
      Ok(CandidateTally {
        candidate_id:   row.get(0)?,
        candidate_name: row.get(1)?,
        votes:          u64::try_from(votes).unwrap_or_default(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn results(conn: &Connection, vote_event_id: i64, group_id: Option<i64>) -> Result<VoteResult> {
  let event = get_vote_event(conn, vote_event_id)?
    .ok_or(CoreError::VoteEventNotFound(vote_event_id))?;
  if let Some(g) = group_id {
    ensure_group(conn, g)?;
  }

  let counts = tally(conn, &[vote_event_id], group_id)?;
  Ok(VoteResult::for_event(&event, counts))
}

pub fn combined_results(
  conn: &Connection,
  vote_event_ids: &[i64],
  group_id: Option<i64>,
) -> Result<VoteResult> {
  let ids = distinct_event_ids(vote_event_ids)?;

  let mut events = Vec::with_capacity(ids.len());
  for id in &ids {
    let event = get_vote_event(conn, *id)?.ok_or(CoreError::UnknownVoteEvent(*id))?;
    events.push(event);
  }
  ensure_same_slate(&events)?;

  if let Some(g) = group_id {
    ensure_group(conn, g)?;
  }

  let counts = tally(conn, &ids, group_id)?;
  Ok(VoteResult::combined(&events, counts))
}
