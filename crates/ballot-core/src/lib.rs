//! Core types and trait definitions for the ballot voting backend.
//!
//! No HTTP or database dependencies. This crate holds the domain records, the
//! error taxonomy, the [`store::VoteStore`] abstraction, and the pure rules
//! (slate resolution, slate equality, breakdown ranking) that every backend
//! applies.

pub mod ballot;
pub mod error;
pub mod event;
pub mod registry;
pub mod store;
pub mod tally;

pub use error::{Classify, Error, ErrorKind, Result};
