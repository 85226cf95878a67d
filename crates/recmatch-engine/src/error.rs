//! Error types for matching operations.

use std::fmt;

use recmatch_model::ModelError;
use thiserror::Error;

/// Which side of a run a dataset plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetRole {
    /// Rows seeking a match ("to").
    Destination,
    /// Candidate pool ("from").
    Source,
}

impl fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destination => f.write_str("destination"),
            Self::Source => f.write_str("source"),
        }
    }
}

/// Coarse classification used by callers deciding how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration must be fixed before retrying.
    Configuration,
    /// Degenerate uniqueness arithmetic (empty or constant data).
    Division,
    /// The live datasets do not have the configured columns.
    DataShape,
}

/// Errors from configuration edits and matching runs.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MatchError {
    /// No destination column maps to any source column.
    #[error("no active columns: map at least one destination column to a source column")]
    NoActiveColumns,

    /// A column to copy does not exist in the source dataset.
    #[error("column to get '{0}' is not in the source dataset")]
    UnknownGetColumn(String),

    /// Threshold outside the 0-100 percentage range.
    #[error("threshold {0} is out of range: enter a number between 0 and 100")]
    InvalidThreshold(f64),

    /// Column is already part of the configuration.
    #[error("column '{0}' is already configured")]
    AlreadyConfigured(String),

    /// Column is not part of the configuration.
    #[error("column '{0}' is not configured")]
    NotConfigured(String),

    /// Uniqueness over a dataset without rows.
    #[error("cannot compute uniqueness of an empty dataset")]
    EmptyDataset,

    /// Selected column weights sum to zero.
    #[error("column weights for {columns:?} sum to zero")]
    DegenerateWeights { columns: Vec<String> },

    /// Weight lookup for a column that was never measured.
    #[error("no uniqueness measured for column '{0}'")]
    UnknownColumn(String),

    /// A configured column is missing from a live dataset.
    #[error("column '{column}' not found in the {role} dataset")]
    MissingColumn { role: DatasetRole, column: String },

    /// A destination row index outside the dataset.
    #[error("row {row} is out of range for a dataset with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDataset | Self::DegenerateWeights { .. } => ErrorKind::Division,
            Self::MissingColumn { .. } | Self::RowOutOfRange { .. } | Self::Model(_) => {
                ErrorKind::DataShape
            }
            _ => ErrorKind::Configuration,
        }
    }

    /// True for errors the caller fixes by editing the configuration.
    ///
    /// Division errors count as configuration errors at the call site.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Division)
    }

    /// Get the column name associated with this error, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnknownGetColumn(c)
            | Self::AlreadyConfigured(c)
            | Self::NotConfigured(c)
            | Self::UnknownColumn(c) => Some(c),
            Self::MissingColumn { column, .. } => Some(column),
            _ => None,
        }
    }
}

/// Result type for matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(MatchError::NoActiveColumns.kind(), ErrorKind::Configuration);
        assert_eq!(MatchError::EmptyDataset.kind(), ErrorKind::Division);
        assert!(MatchError::EmptyDataset.is_configuration_error());

        let drift = MatchError::MissingColumn {
            role: DatasetRole::Source,
            column: "office".to_string(),
        };
        assert_eq!(drift.kind(), ErrorKind::DataShape);
        assert!(!drift.is_configuration_error());
        assert_eq!(drift.column(), Some("office"));
        assert_eq!(
            drift.to_string(),
            "column 'office' not found in the source dataset"
        );
    }
}
