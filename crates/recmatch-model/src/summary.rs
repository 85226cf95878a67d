//! Aggregate statistics for one matching run.

use serde::{Deserialize, Serialize};

use crate::result::{MatchResult, MatchStatus};

/// Sentinel for `highest_score` / `lowest_score` when no row resolved.
pub const NO_SCORE: f64 = -1.0;

/// Counts by status plus score statistics over resolved rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Rows classified as MATCHED.
    pub optimal: usize,
    pub review: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
    /// Rows that carry a score (MATCHED + REVIEW).
    pub scored: usize,
    /// Destination rows processed.
    pub total: usize,
    /// Mean score over resolved rows, `0.0` when none resolved.
    pub average_score: f64,
    /// Best score over resolved rows, [`NO_SCORE`] when none resolved.
    pub highest_score: f64,
    /// Worst score over resolved rows, [`NO_SCORE`] when none resolved.
    pub lowest_score: f64,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            optimal: 0,
            review: 0,
            ambiguous: 0,
            unmatched: 0,
            scored: 0,
            total: 0,
            average_score: 0.0,
            highest_score: NO_SCORE,
            lowest_score: NO_SCORE,
        }
    }
}

impl RunSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut scores = Vec::new();
        for result in results {
            match result.status {
                MatchStatus::Matched => summary.optimal += 1,
                MatchStatus::Review => summary.review += 1,
                MatchStatus::Ambiguous => summary.ambiguous += 1,
                MatchStatus::Unmatched => summary.unmatched += 1,
            }
            if result.status.is_resolved()
                && let Some(score) = result.score
            {
                scores.push(score);
            }
        }
        if scores.is_empty() {
            return summary;
        }
        summary.scored = scores.len();
        summary.average_score = scores.iter().sum::<f64>() / scores.len() as f64;
        summary.highest_score = scores.iter().copied().fold(f64::MIN, f64::max);
        summary.lowest_score = scores.iter().copied().fold(f64::MAX, f64::min);
        summary
    }

    /// Share of destination rows that resolved to a single source row.
    pub fn resolved_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.scored as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_use_sentinels() {
        let summary = RunSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.highest_score, NO_SCORE);
        assert_eq!(summary.lowest_score, NO_SCORE);
        assert_eq!(summary.resolved_ratio(), 0.0);
    }

    #[test]
    fn scores_ignore_unresolved_rows() {
        let results = vec![
            MatchResult::resolved(MatchStatus::Matched, 0, 1.0, Vec::new()),
            MatchResult::resolved(MatchStatus::Review, 1, 0.5, Vec::new()),
            MatchResult::ambiguous(vec![2, 3]),
            MatchResult::unmatched(),
        ];
        let summary = RunSummary::from_results(&results);

        assert_eq!(summary.optimal, 1);
        assert_eq!(summary.review, 1);
        assert_eq!(summary.ambiguous, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.total, 4);
        assert!((summary.average_score - 0.75).abs() < 1e-12);
        assert_eq!(summary.highest_score, 1.0);
        assert_eq!(summary.lowest_score, 0.5);
        assert!((summary.resolved_ratio() - 0.5).abs() < 1e-12);
    }
}
