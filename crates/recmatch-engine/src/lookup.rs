//! Single-record lookups over a candidate pool.
//!
//! Each lookup scores one record against every row of `records`, keeps the
//! rows tied at the best score and drops them all when the best score is
//! below `threshold` (a `0..=1` fraction). Returned indices are in row
//! order.

use std::collections::BTreeMap;

use recmatch_model::Dataset;

use crate::engine::top_candidates;
use crate::error::{DatasetRole, MatchError, Result};
use crate::similarity::similarity;
use crate::uniqueness::adjusted_uniqueness;

/// A record to look up, keyed by column name.
pub type Record = BTreeMap<String, String>;

fn check_fraction(threshold: f64) -> Result<()> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(MatchError::InvalidThreshold(threshold))
    }
}

fn record_value<'r>(record: &'r Record, column: &str) -> Result<&'r str> {
    record
        .get(column)
        .map(String::as_str)
        .ok_or_else(|| MatchError::MissingColumn {
            role: DatasetRole::Destination,
            column: column.to_string(),
        })
}

fn pool_values<'d>(records: &'d Dataset, column: &str) -> Result<Vec<&'d str>> {
    records
        .column_values(column)
        .map_err(|_| MatchError::MissingColumn {
            role: DatasetRole::Source,
            column: column.to_string(),
        })
}

fn indices(top: Vec<(usize, f64)>) -> Vec<usize> {
    top.into_iter().map(|(index, _)| index).collect()
}

/// Rows of `records` whose `column` best matches the record's `column`.
pub fn best_matches(
    records: &Dataset,
    record: &Record,
    column: &str,
    threshold: f64,
) -> Result<Vec<usize>> {
    check_fraction(threshold)?;
    let value = record_value(record, column)?;
    let pool = pool_values(records, column)?;
    let scores = pool
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, similarity(value, candidate)));
    Ok(indices(top_candidates(scores, threshold)))
}

/// Rows of `records` where any of `other_columns` best matches the
/// record's `column`. Each row scores as its best column.
pub fn cross_matches<S: AsRef<str>>(
    records: &Dataset,
    record: &Record,
    column: &str,
    other_columns: &[S],
    threshold: f64,
) -> Result<Vec<usize>> {
    check_fraction(threshold)?;
    if other_columns.is_empty() {
        return Err(MatchError::NoActiveColumns);
    }
    let value = record_value(record, column)?;
    let pools = other_columns
        .iter()
        .map(|other| pool_values(records, other.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let scores = (0..records.row_count()).map(|index| {
        let best = pools
            .iter()
            .map(|pool| similarity(value, pool[index]))
            .fold(0.0, f64::max);
        (index, best)
    });
    Ok(indices(top_candidates(scores, threshold)))
}

/// Rows of `records` that best match the record across `columns`, each
/// column weighted by its adjusted share of `uniqueness`.
pub fn combined_matches<S: AsRef<str>>(
    records: &Dataset,
    record: &Record,
    columns: &[S],
    uniqueness: &BTreeMap<String, f64>,
    threshold: f64,
) -> Result<Vec<usize>> {
    check_fraction(threshold)?;
    let weights = adjusted_uniqueness(uniqueness, columns)?;
    let mut weighted = Vec::with_capacity(columns.len());
    for column in columns {
        let column = column.as_ref();
        let weight = weights
            .get(column)
            .copied()
            .ok_or_else(|| MatchError::UnknownColumn(column.to_string()))?;
        weighted.push((
            record_value(record, column)?,
            pool_values(records, column)?,
            weight,
        ));
    }

    let scores = (0..records.row_count()).map(|index| {
        let total = weighted
            .iter()
            .map(|(value, pool, weight)| similarity(value, pool[index]) * weight)
            .sum::<f64>();
        (index, total)
    });
    Ok(indices(top_candidates(scores, threshold)))
}
