//! Error types for the ballot-roll codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("voter roll is not valid UTF-8: {0}")]
  Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
