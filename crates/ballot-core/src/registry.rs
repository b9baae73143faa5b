//! Registry records: groups, candidates and voters.
//!
//! These are created once and never updated or deleted. Cross-references are
//! plain ids; any joining happens at query time in the store.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Group ───────────────────────────────────────────────────────────────────

/// A named set of voters (and the candidates who stand for it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub group_id: i64,
  pub name:     String,
}

/// Input to [`crate::store::VoteStore::add_group`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
  pub name: String,
}

impl NewGroup {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

  /// Trim the name and reject it if nothing is left.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self { name: non_empty(self.name).ok_or(Error::EmptyName)? })
  }
}

// ─── Candidate ───────────────────────────────────────────────────────────────

/// Someone who can appear on a vote event's slate.
///
/// A candidate belongs to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub candidate_id: i64,
  pub name:         String,
  pub group_id:     i64,
}

/// Input to [`crate::store::VoteStore::add_candidate`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
  pub name:     String,
  pub group_id: i64,
}

impl NewCandidate {
  pub fn new(name: impl Into<String>, group_id: i64) -> Self {
    Self { name: name.into(), group_id }
  }

  pub fn normalized(self) -> Result<Self> {
    Ok(Self {
      name:     non_empty(self.name).ok_or(Error::EmptyName)?,
      group_id: self.group_id,
    })
  }
}

// ─── Voter ───────────────────────────────────────────────────────────────────

/// A registered voter. The phone number is the natural key used when casting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
  pub voter_id: i64,
  pub name:     Option<String>,
  /// Globally unique (enforced by a UNIQUE constraint).
  pub phone:    String,
  pub group_id: i64,
}

/// Input to [`crate::store::VoteStore::add_voter`] and
/// [`crate::store::VoteStore::import_voters`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewVoter {
  pub name:     Option<String>,
  pub phone:    String,
  pub group_id: i64,
}

impl NewVoter {
  pub fn new(name: Option<&str>, phone: impl Into<String>, group_id: i64) -> Self {
    Self {
      name: name.map(str::to_owned),
      phone: phone.into(),
      group_id,
    }
  }

  /// Trim both fields; a blank name becomes `None`, a blank phone is an error.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self {
      name:     self.name.and_then(non_empty),
      phone:    non_empty(self.phone).ok_or(Error::EmptyPhone)?,
      group_id: self.group_id,
    })
  }
}

fn non_empty(s: String) -> Option<String> {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    None
  } else if trimmed.len() == s.len() {
    Some(s)
  } else {
    Some(trimmed.to_owned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn group_name_is_trimmed() {
    let g = NewGroup::new("  North  ").normalized().unwrap();
    assert_eq!(g.name, "North");
  }

  #[test]
  fn blank_candidate_name_rejected() {
    let err = NewCandidate::new("   ", 1).normalized().unwrap_err();
    assert!(matches!(err, Error::EmptyName));
  }

  #[test]
  fn voter_blank_name_becomes_none() {
    let v = NewVoter::new(Some(" "), " 555 ", 1).normalized().unwrap();
    assert_eq!(v.name, None);
    assert_eq!(v.phone, "555");
  }

  #[test]
  fn voter_blank_phone_rejected() {
    let err = NewVoter::new(Some("Alice"), "", 1).normalized().unwrap_err();
    assert!(matches!(err, Error::EmptyPhone));
  }
}
