//! SQL schema for the ballot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS voter_groups (
    group_id  INTEGER PRIMARY KEY,
    name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS candidates (
    candidate_id  INTEGER PRIMARY KEY,
    name          TEXT NOT NULL,
    group_id      INTEGER NOT NULL REFERENCES voter_groups(group_id)
);

CREATE TABLE IF NOT EXISTS voters (
    voter_id  INTEGER PRIMARY KEY,
    name      TEXT,
    phone     TEXT NOT NULL,
    group_id  INTEGER NOT NULL REFERENCES voter_groups(group_id),
    UNIQUE (phone)
);

CREATE TABLE IF NOT EXISTS vote_events (
    vote_event_id  INTEGER PRIMARY KEY,
    title          TEXT NOT NULL,
    created_at     TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

-- The slate. Written once, in the same transaction as its event.
CREATE TABLE IF NOT EXISTS vote_event_candidates (
    vote_event_candidate_id  INTEGER PRIMARY KEY,
    vote_event_id            INTEGER NOT NULL REFERENCES vote_events(vote_event_id),
    candidate_id             INTEGER NOT NULL REFERENCES candidates(candidate_id),
    UNIQUE (vote_event_id, candidate_id)
);

-- Cast votes are strictly append-only.
-- The UNIQUE pair is what ultimately guarantees one vote per voter per event.
CREATE TABLE IF NOT EXISTS cast_votes (
    cast_vote_id   INTEGER PRIMARY KEY,
    cast_at        TEXT NOT NULL,
    voter_id       INTEGER NOT NULL REFERENCES voters(voter_id),
    vote_event_id  INTEGER NOT NULL REFERENCES vote_events(vote_event_id),
    candidate_id   INTEGER NOT NULL REFERENCES candidates(candidate_id),
    UNIQUE (voter_id, vote_event_id)
);

CREATE INDEX IF NOT EXISTS candidates_group_idx ON candidates(group_id);
CREATE INDEX IF NOT EXISTS voters_group_idx     ON voters(group_id);
CREATE INDEX IF NOT EXISTS cast_votes_event_idx ON cast_votes(vote_event_id);

PRAGMA user_version = 1;
";
