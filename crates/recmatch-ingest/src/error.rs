//! Error types for dataset loading and export.

use std::path::PathBuf;

use recmatch_model::ModelError;
use thiserror::Error;

/// Errors that can occur while reading or writing a dataset file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Format Errors ===
    /// Extension is not a supported delimited format.
    #[error("unsupported file extension '{extension}' for {path}: use .csv or .tsv")]
    UnsupportedExtension { path: PathBuf, extension: String },

    /// Malformed delimited content.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("file is empty: {path}")]
    EmptyFile { path: PathBuf },

    /// Failed to write the output file.
    #[error("failed to write {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    // === Model Errors ===
    /// Header or rows do not form a valid dataset.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
