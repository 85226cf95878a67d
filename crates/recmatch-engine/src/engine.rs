//! The matching pass.
//!
//! For every destination row the engine scores every source row column by
//! column, weights each column by its adjusted uniqueness, keeps every
//! candidate tied at the best aggregate score and classifies the row.

use std::collections::BTreeMap;

use recmatch_model::{Dataset, MatchResult, MatchStatus, RunSummary};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::{MatchConfig, threshold_fraction};
use crate::error::{DatasetRole, MatchError, Result};
use crate::similarity::{normalize, score_normalized};
use crate::uniqueness::{adjusted_uniqueness, uniqueness_of};

/// Scores closer than this to the best score count as tied.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Output column holding the row's [`MatchStatus`].
pub const STATUS_COLUMN: &str = "match_status";
/// Output column holding the aggregate score, blank unless resolved.
pub const SCORE_COLUMN: &str = "match_score";
/// Output column holding the matched or tied source row indices.
pub const ROW_INDEX_COLUMN: &str = "row_index";

/// Rounds a `0..=1` score to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Every candidate tied at the best score that also meets `threshold`.
///
/// `scores` pairs a candidate index with its score. The threshold test
/// compares both sides rounded to two decimals. Output keeps input order.
pub(crate) fn top_candidates<I>(scores: I, threshold: f64) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let scores: Vec<(usize, f64)> = scores.into_iter().collect();
    let Some(best) = scores.iter().map(|&(_, score)| score).reduce(f64::max) else {
        return Vec::new();
    };
    let threshold = round2(threshold);
    scores
        .into_iter()
        .filter(|&(_, score)| best - score <= SCORE_EPSILON && round2(score) >= threshold)
        .collect()
}

/// How one column contributed to a candidate's aggregate score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnContribution {
    pub column: String,
    /// Raw similarity in `0..=1`.
    pub similarity: f64,
    /// Adjusted uniqueness of the column.
    pub weight: f64,
    /// True when the cutoff removed this column's score.
    pub pruned: bool,
}

impl ColumnContribution {
    pub fn weighted(&self) -> f64 {
        if self.pruned {
            0.0
        } else {
            self.similarity * self.weight
        }
    }
}

/// One source row scored against a destination row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub source_row: usize,
    /// Weighted sum over the columns that were not pruned.
    pub score: f64,
    pub explanation: Vec<ColumnContribution>,
}

impl CandidateScore {
    /// False when the cutoff pruned every column.
    pub fn is_candidate(&self) -> bool {
        self.explanation.iter().any(|c| !c.pruned)
    }

    /// Human-readable breakdown of the score.
    pub fn explain(&self) -> String {
        self.explanation
            .iter()
            .map(|c| {
                if c.pruned {
                    format!("{}: {:.0}% (pruned)", c.column, c.similarity * 100.0)
                } else {
                    format!(
                        "{}: {:.0}% x {:.2}",
                        c.column,
                        c.similarity * 100.0,
                        c.weight
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Results of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// One result per destination row, in destination order.
    pub results: Vec<MatchResult>,
    pub summary: RunSummary,
    /// Score a candidate needs to be MATCHED rather than REVIEW.
    pub optimal_threshold: f64,
    /// Adjusted uniqueness per active column.
    pub weights: BTreeMap<String, f64>,
    /// Source columns copied into resolved rows.
    pub get_columns: Vec<String>,
}

impl MatchOutcome {
    fn new(
        results: Vec<MatchResult>,
        optimal_threshold: f64,
        weights: BTreeMap<String, f64>,
        get_columns: Vec<String>,
    ) -> Self {
        let summary = RunSummary::from_results(&results);
        Self {
            results,
            summary,
            optimal_threshold,
            weights,
            get_columns,
        }
    }

    /// Appends the match columns to a copy of `to`.
    ///
    /// Adds `match_status`, `match_score` and `row_index`, overwriting them
    /// in place when `to` is the output of an earlier run, then each copied
    /// source column. A copied column whose name is already taken gets a
    /// `_source` suffix.
    pub fn annotate(&self, to: &Dataset) -> Result<Dataset> {
        let mut annotated = to.clone();
        annotated.set_column(
            STATUS_COLUMN,
            self.results
                .iter()
                .map(|r| r.status.as_str().to_string())
                .collect(),
        )?;
        annotated.set_column(
            SCORE_COLUMN,
            self.results.iter().map(MatchResult::score_label).collect(),
        )?;
        annotated.set_column(
            ROW_INDEX_COLUMN,
            self.results
                .iter()
                .map(MatchResult::row_index_label)
                .collect(),
        )?;

        for column in &self.get_columns {
            let mut name = column.clone();
            while annotated.has_column(&name) {
                name.push_str("_source");
            }
            let values = self
                .results
                .iter()
                .map(|result| {
                    result
                        .copied
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default()
                })
                .collect();
            annotated.push_column(name, values)?;
        }
        Ok(annotated)
    }
}

/// Runs the matching pass for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine<'a> {
    config: &'a MatchConfig,
}

impl<'a> MatchEngine<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        self.config
    }

    /// Matches every destination row against the source dataset.
    pub fn run(&self, to: &Dataset, from: &Dataset) -> Result<MatchOutcome> {
        self.run_with_progress(to, from, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(done, total)` after each
    /// destination row.
    pub fn run_with_progress<F>(
        &self,
        to: &Dataset,
        from: &Dataset,
        mut progress: F,
    ) -> Result<MatchOutcome>
    where
        F: FnMut(usize, usize),
    {
        let span = info_span!(
            "match_run",
            destination_rows = to.row_count(),
            source_rows = from.row_count()
        );
        let _guard = span.enter();

        self.config.validate(to, from)?;
        let get_columns = self.config.get_columns().to_vec();
        let total = to.row_count();

        if to.is_empty() || from.is_empty() {
            debug!("empty dataset, every destination row is unmatched");
            let results = vec![MatchResult::unmatched(); total];
            progress(total, total);
            return Ok(MatchOutcome::new(
                results,
                0.0,
                BTreeMap::new(),
                get_columns,
            ));
        }

        let prepared = Prepared::build(self.config, to, from)?;
        let mut results = Vec::with_capacity(total);
        for (index, row) in to.rows().iter().enumerate() {
            let result = prepared.classify(row, from);
            debug!(
                row = index,
                status = %result.status,
                candidates = result.source_rows.len(),
                "classified row"
            );
            results.push(result);
            progress(index + 1, total);
        }

        let outcome = MatchOutcome::new(
            results,
            prepared.optimal_threshold,
            prepared.weights,
            get_columns,
        );
        let summary = &outcome.summary;
        info!(
            optimal = summary.optimal,
            review = summary.review,
            ambiguous = summary.ambiguous,
            unmatched = summary.unmatched,
            average_score = summary.average_score,
            optimal_threshold = outcome.optimal_threshold,
            "match run complete"
        );
        Ok(outcome)
    }

    /// Top `limit` candidates for one destination row with per-column
    /// breakdowns, best first and then by source row.
    ///
    /// Source rows pruned in every column are left out.
    pub fn explain_row(
        &self,
        to: &Dataset,
        from: &Dataset,
        row: usize,
        limit: usize,
    ) -> Result<Vec<CandidateScore>> {
        self.config.validate(to, from)?;
        let dest = to.row(row).ok_or(MatchError::RowOutOfRange {
            row,
            rows: to.row_count(),
        })?;
        if from.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = Prepared::build(self.config, to, from)?;
        let dest = prepared.normalize_row(dest);
        let mut candidates: Vec<CandidateScore> = (0..from.row_count())
            .map(|source| prepared.explain(&dest, source))
            .filter(CandidateScore::is_candidate)
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.source_row.cmp(&b.source_row))
        });
        candidates.truncate(limit);
        Ok(candidates)
    }
}

/// Per-run state computed once before any row is scored.
struct Prepared {
    columns: Vec<PreparedColumn>,
    weights: BTreeMap<String, f64>,
    optimal_threshold: f64,
    required: f64,
    get_columns: Vec<String>,
}

struct PreparedColumn {
    name: String,
    dest_index: usize,
    weight: f64,
    /// Cutoff as a fraction; `None` when the cutoff is off.
    cutoff: Option<f64>,
    /// Space-joined, normalized source text per source row.
    texts: Vec<String>,
}

impl Prepared {
    fn build(config: &MatchConfig, to: &Dataset, from: &Dataset) -> Result<Self> {
        let active = config.active_columns();
        let names: Vec<&str> = active.iter().map(|rule| rule.column.as_str()).collect();
        let weights = adjusted_uniqueness(&uniqueness_of(to, &names)?, &names)?;

        let mut columns = Vec::with_capacity(active.len());
        let mut optimal_threshold = 0.0;
        for rule in active {
            let weight = weights
                .get(&rule.column)
                .copied()
                .ok_or_else(|| MatchError::UnknownColumn(rule.column.clone()))?;
            let dest_index =
                to.column_index(&rule.column)
                    .ok_or_else(|| MatchError::MissingColumn {
                        role: DatasetRole::Destination,
                        column: rule.column.clone(),
                    })?;
            let source_indices = rule
                .sources
                .iter()
                .map(|source| {
                    from.column_index(source)
                        .ok_or_else(|| MatchError::MissingColumn {
                            role: DatasetRole::Source,
                            column: source.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            let texts = from
                .rows()
                .iter()
                .map(|row| {
                    let joined = source_indices
                        .iter()
                        .map(|&i| row[i].as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    normalize(&joined)
                })
                .collect();

            optimal_threshold += threshold_fraction(rule.threshold) * weight;
            debug!(
                column = %rule.column,
                weight,
                threshold = rule.threshold,
                "column weight"
            );
            columns.push(PreparedColumn {
                name: rule.column.clone(),
                dest_index,
                weight,
                cutoff: config
                    .cutoff()
                    .then(|| threshold_fraction(rule.threshold)),
                texts,
            });
        }

        Ok(Self {
            columns,
            weights,
            optimal_threshold,
            required: threshold_fraction(config.required_threshold()),
            get_columns: config.get_columns().to_vec(),
        })
    }

    /// Normalized destination value for each prepared column.
    fn normalize_row(&self, dest: &[String]) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| normalize(&dest[column.dest_index]))
            .collect()
    }

    /// Aggregate score of `source` against a normalized destination row,
    /// or `None` when the cutoff pruned every column.
    fn aggregate(&self, dest: &[String], source: usize) -> Option<f64> {
        let mut total = 0.0;
        let mut kept = false;
        for (column, value) in self.columns.iter().zip(dest) {
            let score = score_normalized(value, &column.texts[source]);
            if column.cutoff.is_some_and(|cutoff| score < cutoff) {
                continue;
            }
            total += score * column.weight;
            kept = true;
        }
        kept.then_some(total)
    }

    fn explain(&self, dest: &[String], source: usize) -> CandidateScore {
        let explanation: Vec<ColumnContribution> = self
            .columns
            .iter()
            .zip(dest)
            .map(|(column, value)| {
                let score = score_normalized(value, &column.texts[source]);
                ColumnContribution {
                    column: column.name.clone(),
                    similarity: score,
                    weight: column.weight,
                    pruned: column.cutoff.is_some_and(|cutoff| score < cutoff),
                }
            })
            .collect();
        CandidateScore {
            source_row: source,
            score: explanation.iter().map(ColumnContribution::weighted).sum(),
            explanation,
        }
    }

    fn classify(&self, dest: &[String], from: &Dataset) -> MatchResult {
        let dest = self.normalize_row(dest);
        let scores = (0..from.row_count())
            .filter_map(|source| self.aggregate(&dest, source).map(|score| (source, score)));
        let top = top_candidates(scores, self.required);

        match top.as_slice() {
            [] => MatchResult::unmatched(),
            [(source, score)] => {
                let status = if round2(*score) >= round2(self.optimal_threshold) {
                    MatchStatus::Matched
                } else {
                    MatchStatus::Review
                };
                MatchResult::resolved(status, *source, *score, self.copy_values(from, *source))
            }
            _ => MatchResult::ambiguous(top.iter().map(|&(source, _)| source).collect()),
        }
    }

    fn copy_values(&self, from: &Dataset, source: usize) -> Vec<(String, String)> {
        self.get_columns
            .iter()
            .map(|column| {
                let value = from.value(source, column).unwrap_or_default();
                (column.clone(), value.to_string())
            })
            .collect()
    }
}
