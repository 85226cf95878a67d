//! Per-column checks used to vet a dataset before matching.

use std::collections::BTreeMap;

use recmatch_model::Dataset;
use serde::Serialize;

use crate::error::{MatchError, Result};
use crate::uniqueness::uniqueness;

fn values<'d>(dataset: &'d Dataset, column: &str) -> Result<Vec<&'d str>> {
    dataset
        .column_values(column)
        .map_err(|_| MatchError::UnknownColumn(column.to_string()))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Share of rows (0-100) holding each distinct value, ordered by value.
pub fn column_group_percentage(dataset: &Dataset, column: &str) -> Result<Vec<(String, f64)>> {
    let values = values(dataset, column)?;
    if values.is_empty() {
        return Err(MatchError::EmptyDataset);
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in &values {
        *counts.entry(*value).or_default() += 1;
    }
    let rows = values.len() as f64;
    Ok(counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count as f64 / rows * 100.0))
        .collect())
}

/// Rows whose non-blank value appears more than once in `column`.
///
/// Every occurrence is returned, in row order.
pub fn column_duplicates(dataset: &Dataset, column: &str) -> Result<Vec<(usize, String)>> {
    let values = values(dataset, column)?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().filter(|v| !is_blank(v)) {
        *counts.entry(*value).or_default() += 1;
    }
    Ok(values
        .iter()
        .enumerate()
        .filter(|(_, value)| counts.get(*value).is_some_and(|&count| count > 1))
        .map(|(index, value)| (index, (*value).to_string()))
        .collect())
}

/// Rows whose value in `column` is blank.
pub fn column_blanks(dataset: &Dataset, column: &str) -> Result<Vec<usize>> {
    Ok(values(dataset, column)?
        .iter()
        .enumerate()
        .filter(|(_, value)| is_blank(value))
        .map(|(index, _)| index)
        .collect())
}

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub uniqueness: f64,
    pub blanks: usize,
    pub duplicates: usize,
}

/// Profiles every column of `dataset` in column order.
pub fn profile(dataset: &Dataset) -> Result<Vec<ColumnProfile>> {
    let weights = uniqueness(dataset)?;
    dataset
        .columns()
        .iter()
        .map(|column| {
            Ok(ColumnProfile {
                column: column.clone(),
                uniqueness: weights.get(column).copied().unwrap_or_default(),
                blanks: column_blanks(dataset, column)?.len(),
                duplicates: column_duplicates(dataset, column)?.len(),
            })
        })
        .collect()
}
