//! Row-oriented string table used for both sides of a reconciliation run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// An ordered sequence of rows keyed by unique column names.
///
/// Every cell is a string; the blank string is the only "no value" marker.
/// Column order is insertion order and is preserved on output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Serialized shape of a [`Dataset`], checked by [`Dataset::from_rows`].
#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ModelError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Self::from_rows(raw.columns, raw.rows)
    }
}

impl Dataset {
    /// Creates an empty dataset with the given columns.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ModelError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Creates a dataset and fills it with `rows`.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<String>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dataset = Self::new(columns)?;
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Appends a row. The row must carry one cell per column.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a column holding one value per existing row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(ModelError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(ModelError::ColumnLength {
                column: name,
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }

    /// Replaces the values of `name` in place, or appends it when absent.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        let name = name.into();
        let Some(idx) = self.column_index(&name) else {
            return self.push_column(name, values);
        };
        if values.len() != self.rows.len() {
            return Err(ModelError::ColumnLength {
                column: name,
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the cell at `row` in `column`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Returns row `index` keyed by column name.
    pub fn record(&self, index: usize) -> Option<BTreeMap<String, String>> {
        let row = self.rows.get(index)?;
        Some(self.columns.iter().cloned().zip(row.iter().cloned()).collect())
    }

    /// Returns every value of `column` in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| ModelError::ColumnNotFound(column.to_string()))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}
