//! Per-row outcome of a matching pass.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a destination row after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    /// No candidate reached the required threshold.
    Unmatched,
    /// A single best candidate at or above the optimal threshold.
    Matched,
    /// A single best candidate between the required and optimal thresholds.
    Review,
    /// Several candidates tied at the best score.
    Ambiguous,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmatched => "UNMATCHED",
            Self::Matched => "MATCHED",
            Self::Review => "REVIEW",
            Self::Ambiguous => "AMBIGUOUS",
        }
    }

    /// True when the row resolved to exactly one source row.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Matched | Self::Review)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one destination row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub status: MatchStatus,
    /// One index when resolved, every tied index when ambiguous, none otherwise.
    pub source_rows: Vec<usize>,
    /// Aggregate weighted score; only set for resolved rows.
    pub score: Option<f64>,
    /// Copied source values as `(column, value)`; only set for resolved rows.
    pub copied: Vec<(String, String)>,
}

impl MatchResult {
    pub fn unmatched() -> Self {
        Self {
            status: MatchStatus::Unmatched,
            source_rows: Vec::new(),
            score: None,
            copied: Vec::new(),
        }
    }

    pub fn ambiguous(source_rows: Vec<usize>) -> Self {
        Self {
            status: MatchStatus::Ambiguous,
            source_rows,
            score: None,
            copied: Vec::new(),
        }
    }

    pub fn resolved(
        status: MatchStatus,
        source_row: usize,
        score: f64,
        copied: Vec<(String, String)>,
    ) -> Self {
        debug_assert!(status.is_resolved());
        Self {
            status,
            source_rows: vec![source_row],
            score: Some(score),
            copied,
        }
    }

    /// The single matched source row, if the row resolved.
    pub fn source_row(&self) -> Option<usize> {
        if self.status.is_resolved() {
            self.source_rows.first().copied()
        } else {
            None
        }
    }

    /// Renders the `row_index` output cell.
    pub fn row_index_label(&self) -> String {
        self.source_rows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Renders the `match_score` output cell.
    pub fn score_label(&self) -> String {
        self.score.map(|s| format!("{s:.2}")).unwrap_or_default()
    }
}
