//! CSV and TSV import/export.
//!
//! The first non-blank row is the header. Headers and cells are trimmed and
//! stripped of a byte-order mark, fully blank rows are skipped, and short
//! rows are padded with blanks.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use recmatch_model::Dataset;

use crate::error::{IngestError, Result};

/// Delimited formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimitedFormat {
    Csv,
    Tsv,
}

impl DelimitedFormat {
    /// Picks the format from the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn read_error(path: &Path, error: csv::Error) -> IngestError {
    let message = error.to_string();
    match error.into_kind() {
        csv::ErrorKind::Io(source) => IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        },
        _ => IngestError::CsvParse {
            path: path.to_path_buf(),
            message,
        },
    }
}

fn write_error(path: &Path, error: impl ToString) -> IngestError {
    IngestError::CsvWrite {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Reads a `.csv` or `.tsv` file into a [`Dataset`].
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let format = DelimitedFormat::from_path(path)?;
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter())
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| read_error(path, e))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        let Some(columns) = &header else {
            header = Some(record.iter().map(normalize_header).collect());
            continue;
        };
        if row.len() > columns.len() && row[columns.len()..].iter().any(|c| !c.is_empty()) {
            tracing::warn!(
                path = %path.display(),
                line = line + 1,
                expected = columns.len(),
                found = row.len(),
                "dropping cells beyond the header width"
            );
        }
        let mut padded = row;
        padded.resize(columns.len(), String::new());
        rows.push(padded);
    }

    let Some(columns) = header else {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    };
    let dataset = Dataset::from_rows(columns, rows)?;
    tracing::debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Writes `dataset` as `.csv` or `.tsv`, header first.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let format = DelimitedFormat::from_path(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_path(path)
        .map_err(|e| write_error(path, e))?;
    writer
        .write_record(dataset.columns())
        .map_err(|e| write_error(path, e))?;
    for row in dataset.rows() {
        writer.write_record(row).map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;
    tracing::debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        "wrote dataset"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            DelimitedFormat::from_path(Path::new("a/people.CSV")).unwrap(),
            DelimitedFormat::Csv
        );
        assert_eq!(
            DelimitedFormat::from_path(Path::new("people.tsv"))
                .unwrap()
                .delimiter(),
            b'\t'
        );
        assert!(matches!(
            DelimitedFormat::from_path(Path::new("people.xlsx")),
            Err(IngestError::UnsupportedExtension { extension, .. }) if extension == "xlsx"
        ));
        assert!(DelimitedFormat::from_path(Path::new("people")).is_err());
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        assert_eq!(normalize_header("\u{feff}  first   name "), "first name");
        assert_eq!(normalize_cell("\u{feff}Ann  "), "Ann");
    }
}
