//! Weighted fuzzy record matching.
//!
//! Reconciles a destination dataset against a source dataset that share no
//! key. Each mapped column is compared with [`similarity`], weighted by its
//! adjusted [`uniqueness`](uniqueness::uniqueness), and every destination
//! row is classified as MATCHED, REVIEW, AMBIGUOUS or UNMATCHED.
//!
//! # Example
//!
//! ```ignore
//! use recmatch_engine::{MatchConfig, MatchEngine};
//!
//! let mut config = MatchConfig::for_datasets(&to, &from);
//! config.set_required_threshold(80.0)?;
//! config.add_get_column("office")?;
//!
//! let outcome = MatchEngine::new(&config).run(&to, &from)?;
//! println!("{} optimal matches", outcome.summary.optimal);
//! let annotated = outcome.annotate(&to)?;
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod profile;
pub mod similarity;
pub mod uniqueness;

pub use config::{ColumnRule, DEFAULT_REQUIRED_THRESHOLD, MatchConfig, threshold_fraction};
pub use engine::{
    CandidateScore, ColumnContribution, MatchEngine, MatchOutcome, ROW_INDEX_COLUMN,
    SCORE_COLUMN, SCORE_EPSILON, STATUS_COLUMN,
};
pub use error::{DatasetRole, ErrorKind, MatchError, Result};
pub use lookup::{Record, best_matches, combined_matches, cross_matches};
pub use profile::{
    ColumnProfile, column_blanks, column_duplicates, column_group_percentage, profile,
};
pub use similarity::{Strategy, score_normalized, similarity};
pub use uniqueness::{adjusted_uniqueness, uniqueness, uniqueness_of};
