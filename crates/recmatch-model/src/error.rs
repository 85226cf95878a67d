use thiserror::Error;

/// Errors raised while building or reading a [`crate::Dataset`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("row has {found} cells but the dataset has {expected} columns")]
    RowWidth { expected: usize, found: usize },
    #[error("column '{column}' has {found} values but the dataset has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
