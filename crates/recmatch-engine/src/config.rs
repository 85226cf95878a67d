//! Matching policy edited between runs.
//!
//! [`MatchConfig`] is a plain value: every edit is a method returning
//! `Result`, so a config file, command-line overrides and any interactive
//! front-end all obey the same rules.
//!
//! Keys are strict. Editing or removing a column that is not configured
//! fails with [`MatchError::NotConfigured`]; adding one that already is
//! fails with [`MatchError::AlreadyConfigured`].
//!
//! Thresholds are stored as percentages in `0..=100` and only converted to
//! the `0..=1` score scale by [`threshold_fraction`].

use recmatch_model::Dataset;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetRole, MatchError, Result};

/// Required threshold applied to a fresh configuration.
pub const DEFAULT_REQUIRED_THRESHOLD: f64 = 75.0;

/// Converts a percentage threshold to the `0..=1` score scale.
pub fn threshold_fraction(percent: f64) -> f64 {
    percent / 100.0
}

fn check_threshold(percent: f64) -> Result<f64> {
    if percent.is_finite() && (0.0..=100.0).contains(&percent) {
        Ok(percent)
    } else {
        Err(MatchError::InvalidThreshold(percent))
    }
}

/// One destination column and the source columns it is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    /// Destination column name.
    pub column: String,
    /// Source columns whose values are space-joined into the comparison
    /// text. Empty means the column does not take part in scoring.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Per-column cutoff as a percentage.
    pub threshold: f64,
}

impl ColumnRule {
    pub fn is_active(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Column mappings, thresholds and output columns for a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    columns: Vec<ColumnRule>,
    get_columns: Vec<String>,
    required_threshold: f64,
    cutoff: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            get_columns: Vec::new(),
            required_threshold: DEFAULT_REQUIRED_THRESHOLD,
            cutoff: false,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one rule per destination column at the default required
    /// threshold. See [`seed_from`](Self::seed_from).
    pub fn for_datasets(to: &Dataset, from: &Dataset) -> Self {
        let mut config = Self::new();
        config.seed_from(to, from);
        config
    }

    /// Adds a rule for every destination column not yet configured.
    ///
    /// Each column maps to the same-named source column when there is one
    /// and starts with the current required threshold as its cutoff.
    pub fn seed_from(&mut self, to: &Dataset, from: &Dataset) {
        for column in to.columns() {
            if self.rule(column).is_some() {
                continue;
            }
            let sources = if from.has_column(column) {
                vec![column.clone()]
            } else {
                Vec::new()
            };
            self.columns.push(ColumnRule {
                column: column.clone(),
                sources,
                threshold: self.required_threshold,
            });
        }
    }

    // =========================================================================
    // Column mappings
    // =========================================================================

    /// Adds a destination column with its source columns.
    pub fn add_column<I, S>(&mut self, column: impl Into<String>, sources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = column.into();
        if self.rule(&column).is_some() {
            return Err(MatchError::AlreadyConfigured(column));
        }
        let mut rule = ColumnRule {
            column,
            sources: Vec::new(),
            threshold: self.required_threshold,
        };
        for source in sources {
            let source = source.into();
            if rule.sources.contains(&source) {
                return Err(MatchError::AlreadyConfigured(source));
            }
            rule.sources.push(source);
        }
        self.columns.push(rule);
        Ok(())
    }

    /// Removes a destination column and its threshold.
    pub fn remove_column(&mut self, column: &str) -> Result<ColumnRule> {
        let index = self
            .columns
            .iter()
            .position(|rule| rule.column == column)
            .ok_or_else(|| MatchError::NotConfigured(column.to_string()))?;
        Ok(self.columns.remove(index))
    }

    /// Appends a source column to an existing destination column.
    pub fn add_source(&mut self, column: &str, source: impl Into<String>) -> Result<()> {
        let source = source.into();
        let rule = self.rule_mut(column)?;
        if rule.sources.contains(&source) {
            return Err(MatchError::AlreadyConfigured(source));
        }
        rule.sources.push(source);
        Ok(())
    }

    pub fn remove_source(&mut self, column: &str, source: &str) -> Result<()> {
        let rule = self.rule_mut(column)?;
        let index = rule
            .sources
            .iter()
            .position(|s| s == source)
            .ok_or_else(|| MatchError::NotConfigured(source.to_string()))?;
        rule.sources.remove(index);
        Ok(())
    }

    pub fn sources(&self, column: &str) -> Result<&[String]> {
        self.rule(column)
            .map(|rule| rule.sources.as_slice())
            .ok_or_else(|| MatchError::NotConfigured(column.to_string()))
    }

    /// Every configured rule in insertion order.
    pub fn columns(&self) -> &[ColumnRule] {
        &self.columns
    }

    /// Rules with at least one source column.
    pub fn active_columns(&self) -> Vec<&ColumnRule> {
        self.columns.iter().filter(|rule| rule.is_active()).collect()
    }

    fn rule(&self, column: &str) -> Option<&ColumnRule> {
        self.columns.iter().find(|rule| rule.column == column)
    }

    fn rule_mut(&mut self, column: &str) -> Result<&mut ColumnRule> {
        self.columns
            .iter_mut()
            .find(|rule| rule.column == column)
            .ok_or_else(|| MatchError::NotConfigured(column.to_string()))
    }

    // =========================================================================
    // Thresholds
    // =========================================================================

    pub fn set_column_threshold(&mut self, column: &str, percent: f64) -> Result<()> {
        let percent = check_threshold(percent)?;
        self.rule_mut(column)?.threshold = percent;
        Ok(())
    }

    pub fn column_threshold(&self, column: &str) -> Result<f64> {
        self.rule(column)
            .map(|rule| rule.threshold)
            .ok_or_else(|| MatchError::NotConfigured(column.to_string()))
    }

    pub fn set_required_threshold(&mut self, percent: f64) -> Result<()> {
        self.required_threshold = check_threshold(percent)?;
        Ok(())
    }

    pub fn required_threshold(&self) -> f64 {
        self.required_threshold
    }

    pub fn set_cutoff(&mut self, enabled: bool) {
        self.cutoff = enabled;
    }

    /// Flips the cutoff and returns the new state.
    pub fn toggle_cutoff(&mut self) -> bool {
        self.cutoff = !self.cutoff;
        self.cutoff
    }

    pub fn cutoff(&self) -> bool {
        self.cutoff
    }

    // =========================================================================
    // Output columns
    // =========================================================================

    pub fn add_get_column(&mut self, column: impl Into<String>) -> Result<()> {
        let column = column.into();
        if self.get_columns.contains(&column) {
            return Err(MatchError::AlreadyConfigured(column));
        }
        self.get_columns.push(column);
        Ok(())
    }

    pub fn remove_get_column(&mut self, column: &str) -> Result<()> {
        let index = self
            .get_columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| MatchError::NotConfigured(column.to_string()))?;
        self.get_columns.remove(index);
        Ok(())
    }

    pub fn get_columns(&self) -> &[String] {
        &self.get_columns
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks the configuration against the live datasets.
    ///
    /// Configuration problems are reported before data-shape problems.
    pub fn validate(&self, to: &Dataset, from: &Dataset) -> Result<()> {
        if self.active_columns().is_empty() {
            return Err(MatchError::NoActiveColumns);
        }
        check_threshold(self.required_threshold)?;
        for (index, rule) in self.columns.iter().enumerate() {
            check_threshold(rule.threshold)?;
            if self.columns[..index].iter().any(|r| r.column == rule.column) {
                return Err(MatchError::AlreadyConfigured(rule.column.clone()));
            }
        }
        if let Some(missing) = self.get_columns.iter().find(|c| !from.has_column(c)) {
            return Err(MatchError::UnknownGetColumn(missing.clone()));
        }

        for rule in &self.columns {
            if !to.has_column(&rule.column) {
                return Err(MatchError::MissingColumn {
                    role: DatasetRole::Destination,
                    column: rule.column.clone(),
                });
            }
            if let Some(source) = rule.sources.iter().find(|s| !from.has_column(s)) {
                return Err(MatchError::MissingColumn {
                    role: DatasetRole::Source,
                    column: source.clone(),
                });
            }
        }
        Ok(())
    }
}
