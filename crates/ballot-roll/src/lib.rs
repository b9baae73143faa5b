//! CSV voter-roll codec for ballot.
//!
//! Turns an uploaded `name,phone,group_id` file into [`NewVoter`] inputs for
//! [`ballot_core::store::VoteStore::import_voters`]. Pure synchronous; no HTTP
//! or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let roll = ballot_roll::parse("name,phone,group_id\nAlice,555-0101,1\n");
//! println!("{} voters, {} skipped", roll.voters.len(), roll.skipped.len());
//! ```

pub mod error;
mod parse;

use ballot_core::registry::NewVoter;
pub use error::{Error, Result};

// ─── Public types ────────────────────────────────────────────────────────────

/// The outcome of parsing a voter roll.
#[derive(Debug, Default)]
pub struct VoterRoll {
  /// Well-formed rows, in file order.
  pub voters:  Vec<NewVoter>,
  /// Rows that were dropped, in file order.
  pub skipped: Vec<SkippedRow>,
}

/// A row left out of the roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
  /// 1-based line number in the input.
  pub line:   usize,
  pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
  #[error("expected 3 fields, found {0}")]
  FieldCount(usize),

  #[error("phone is empty")]
  EmptyPhone,

  #[error("unterminated quoted field")]
  UnterminatedQuote,

  #[error("group id is not an integer: {0:?}")]
  InvalidGroupId(String),
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse a voter roll from text.
///
/// Never fails: malformed rows are reported in [`VoterRoll::skipped`].
pub fn parse(input: &str) -> VoterRoll {
  parse::parse_roll(input.strip_prefix('\u{feff}').unwrap_or(input))
}

/// Parse a voter roll from raw upload bytes, stripping a UTF-8 BOM.
pub fn parse_bytes(input: &[u8]) -> Result<VoterRoll> {
  let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
  Ok(parse::parse_roll(std::str::from_utf8(input)?))
}
