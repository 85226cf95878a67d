//! File-level steps shared by the CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recmatch_engine::MatchOutcome;
use recmatch_ingest::{read_dataset, write_dataset};
use recmatch_model::{Dataset, RunSummary};
use serde::Serialize;

/// Suffix appended to the destination file stem for the annotated output.
const OUTPUT_SUFFIX: &str = "_matched";

/// Destination and source datasets for one run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub to: Dataset,
    pub from: Dataset,
}

/// Reads the destination and source files.
pub fn load_inputs(to: &Path, from: &Path) -> Result<Inputs> {
    let to = read_dataset(to).with_context(|| format!("load destination {}", to.display()))?;
    let from = read_dataset(from).with_context(|| format!("load source {}", from.display()))?;
    Ok(Inputs { to, from })
}

/// `people.csv` becomes `people_matched.csv` in the same directory.
pub fn default_output_path(to: &Path) -> PathBuf {
    let stem = to
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{OUTPUT_SUFFIX}");
    if let Some(extension) = to.extension() {
        name.push('.');
        name.push_str(&extension.to_string_lossy());
    }
    to.with_file_name(name)
}

/// Run summary as exported to JSON.
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    #[serde(flatten)]
    pub summary: &'a RunSummary,
    pub optimal_threshold: f64,
    pub weights: &'a BTreeMap<String, f64>,
}

impl<'a> SummaryReport<'a> {
    pub fn new(outcome: &'a MatchOutcome) -> Self {
        Self {
            summary: &outcome.summary,
            optimal_threshold: outcome.optimal_threshold,
            weights: &outcome.weights,
        }
    }
}

/// Writes the annotated destination dataset.
pub fn write_annotated(path: &Path, outcome: &MatchOutcome, to: &Dataset) -> Result<()> {
    let annotated = outcome.annotate(to).context("annotate destination rows")?;
    write_dataset(path, &annotated)
        .with_context(|| format!("write annotated dataset {}", path.display()))?;
    Ok(())
}

/// Writes the run summary as pretty JSON.
pub fn write_summary_json(path: &Path, outcome: &MatchOutcome) -> Result<()> {
    let mut text = serde_json::to_string_pretty(&SummaryReport::new(outcome))
        .context("serialize run summary")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write summary {}", path.display()))?;
    Ok(())
}
