//! Column uniqueness weights.
//!
//! A column's uniqueness is its distinct-value count divided by the row
//! count. Adjusted uniqueness rescales a subset of columns so the weights
//! sum to one and can be used directly as a weighted average.

use std::collections::{BTreeMap, BTreeSet};

use recmatch_model::Dataset;

use crate::error::{MatchError, Result};

/// Uniqueness of every column in `dataset`.
pub fn uniqueness(dataset: &Dataset) -> Result<BTreeMap<String, f64>> {
    uniqueness_of(dataset, dataset.columns())
}

/// Uniqueness of the named columns only.
///
/// Blank cells count as one distinct value.
pub fn uniqueness_of<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
) -> Result<BTreeMap<String, f64>> {
    if dataset.is_empty() {
        return Err(MatchError::EmptyDataset);
    }
    let rows = dataset.row_count() as f64;
    let mut weights = BTreeMap::new();
    for column in columns {
        let column = column.as_ref();
        let values = dataset
            .column_values(column)
            .map_err(|_| MatchError::UnknownColumn(column.to_string()))?;
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        weights.insert(column.to_string(), distinct.len() as f64 / rows);
    }
    Ok(weights)
}

/// Rescales `selected` entries of `uniqueness` so they sum to one.
pub fn adjusted_uniqueness<S: AsRef<str>>(
    uniqueness: &BTreeMap<String, f64>,
    selected: &[S],
) -> Result<BTreeMap<String, f64>> {
    if selected.is_empty() {
        return Err(MatchError::NoActiveColumns);
    }
    let mut picked = BTreeMap::new();
    for column in selected {
        let column = column.as_ref();
        let weight = uniqueness
            .get(column)
            .copied()
            .ok_or_else(|| MatchError::UnknownColumn(column.to_string()))?;
        picked.insert(column.to_string(), weight);
    }

    let total: f64 = picked.values().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(MatchError::DegenerateWeights {
            columns: picked.into_keys().collect(),
        });
    }
    for weight in picked.values_mut() {
        *weight /= total;
    }
    Ok(picked)
}
