//! Core data model for tabular record reconciliation.
//!
//! A [`Dataset`] is an ordered table of string cells. Matching produces one
//! [`MatchResult`] per destination row and a [`RunSummary`] per run.

#![deny(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod result;
pub mod summary;

pub use dataset::Dataset;
pub use error::{ModelError, Result};
pub use result::{MatchResult, MatchStatus};
pub use summary::{NO_SCORE, RunSummary};
