//! Line-oriented CSV reader for voter rolls.
//!
//! Pipeline:
//!   raw &str
//!     └─ lines, blanks dropped
//!          └─ split_fields()  → Vec<String>, joining lines while a quote is open
//!               └─ header check on the first row
//!                    └─ row_to_voter() → NewVoter or SkippedRow

use ballot_core::registry::NewVoter;

use crate::{SkipReason, SkippedRow, VoterRoll};

pub(crate) fn parse_roll(input: &str) -> VoterRoll {
  let mut roll = VoterRoll::default();
  let mut first_row = true;
  // A record whose quoted field runs past the end of its line: (first line, text so far).
  let mut open: Option<(usize, String)> = None;

  for (idx, raw) in input.lines().enumerate() {
    let (line, record) = match open.take() {
      Some((start, mut text)) => {
        text.push('\n');
        text.push_str(raw);
        (start, text)
      }
      None if raw.trim().is_empty() => continue,
      None => (idx + 1, raw.to_owned()),
    };

    let Some(fields) = split_fields(&record) else {
      open = Some((line, record));
      continue;
    };

    if std::mem::take(&mut first_row) && is_header(&fields) {
      continue;
    }

    match row_to_voter(fields) {
      Ok(voter) => roll.voters.push(voter),
      Err(reason) => roll.skipped.push(SkippedRow { line, reason }),
    }
  }

  // The quote never closed; everything from its line on is one bad record.
  if let Some((line, _)) = open {
    roll.skipped.push(SkippedRow { line, reason: SkipReason::UnterminatedQuote });
  }

  roll
}

/// A header carries labels: no digits in the phone column and no integer in
/// the group column.
fn is_header(fields: &[String]) -> bool {
  match fields {
    [_, phone, group_id, ..] => {
      !phone.chars().any(|c| c.is_ascii_digit()) && group_id.trim().parse::<i64>().is_err()
    }
    _ => false,
  }
}

/// Split a record on commas outside double quotes; `""` inside quotes is a
/// literal quote. `None` while a quoted field is still open.
fn split_fields(record: &str) -> Option<Vec<String>> {
  let mut fields = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = record.chars().peekable();

  while let Some(c) = chars.next() {
    match (c, in_quotes) {
      ('"', true) if chars.peek() == Some(&'"') => {
        chars.next();
        field.push('"');
      }
      ('"', true) => in_quotes = false,
      ('"', false) if field.trim().is_empty() => {
        field.clear();
        in_quotes = true;
      }
      (',', false) => fields.push(std::mem::take(&mut field)),
      (c, _) => field.push(c),
    }
  }

  if in_quotes {
    return None;
  }
  fields.push(field);
  Some(fields)
}

fn row_to_voter(fields: Vec<String>) -> Result<NewVoter, SkipReason> {
  let [name, phone, group_id] = <[String; 3]>::try_from(fields)
    .map_err(|fields| SkipReason::FieldCount(fields.len()))?;

  let phone = phone.trim();
  if phone.is_empty() {
    return Err(SkipReason::EmptyPhone);
  }
  let group_id = group_id.trim();
  let group_id = group_id
    .parse::<i64>()
    .map_err(|_| SkipReason::InvalidGroupId(group_id.to_owned()))?;

  let name = Some(name.trim()).filter(|n| !n.is_empty());
  Ok(NewVoter::new(name, phone, group_id))
}
