//! Match configuration files and command-line overrides.
//!
//! Configurations are stored as pretty JSON. Flags are applied on top of a
//! loaded or seeded configuration through the validated [`MatchConfig`]
//! operations, so a file and the command line obey the same rules.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use recmatch_engine::{MatchConfig, MatchError};
use recmatch_model::Dataset;

/// A `--map DEST=SRC[+SRC...]` flag. An empty source list deactivates
/// the destination column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub column: String,
    pub sources: Vec<String>,
}

/// Parses `DEST=SRC[+SRC...]`.
pub fn parse_mapping(raw: &str) -> std::result::Result<ColumnMapping, String> {
    let (column, sources) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DEST=SRC[+SRC...], got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing destination column in '{raw}'"));
    }
    let sources = sources
        .split('+')
        .map(str::trim)
        .filter(|source| !source.is_empty())
        .map(str::to_string)
        .collect();
    Ok(ColumnMapping {
        column: column.to_string(),
        sources,
    })
}

/// Parses `COL=N` where `N` is a percentage.
pub fn parse_column_threshold(raw: &str) -> std::result::Result<(String, f64), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COL=N, got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((column.to_string(), value))
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mappings: Vec<ColumnMapping>,
    pub get_columns: Vec<String>,
    pub required_threshold: Option<f64>,
    pub column_thresholds: Vec<(String, f64)>,
    pub cutoff: bool,
}

impl ConfigOverrides {
    /// Applies the overrides in a fixed order: required threshold,
    /// mappings, column thresholds, get columns, cutoff.
    ///
    /// A mapping replaces the sources of a configured column or adds a new
    /// column, which then starts at the required threshold.
    pub fn apply(&self, config: &mut MatchConfig) -> recmatch_engine::Result<()> {
        if let Some(percent) = self.required_threshold {
            config.set_required_threshold(percent)?;
        }
        for mapping in &self.mappings {
            match config.sources(&mapping.column) {
                Ok(current) => {
                    for source in current.to_vec() {
                        config.remove_source(&mapping.column, &source)?;
                    }
                    for source in &mapping.sources {
                        config.add_source(&mapping.column, source.clone())?;
                    }
                }
                Err(MatchError::NotConfigured(_)) => {
                    config.add_column(mapping.column.clone(), mapping.sources.iter().cloned())?;
                }
                Err(error) => return Err(error),
            }
        }
        for (column, percent) in &self.column_thresholds {
            config.set_column_threshold(column, *percent)?;
        }
        for column in &self.get_columns {
            config.add_get_column(column.clone())?;
        }
        if self.cutoff {
            config.set_cutoff(true);
        }
        Ok(())
    }
}

/// Reads a configuration file.
pub fn load_config(path: &Path) -> Result<MatchConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parse configuration {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Writes a configuration file as pretty JSON.
pub fn save_config(path: &Path, config: &MatchConfig) -> Result<()> {
    let mut text = serde_json::to_string_pretty(config).context("serialize configuration")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write configuration {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved configuration");
    Ok(())
}

/// Loads `path` when given, otherwise seeds a configuration from the
/// datasets, then applies `overrides`.
///
/// Seeded columns start at the overridden required threshold.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
    to: &Dataset,
    from: &Dataset,
) -> Result<MatchConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => {
            let mut config = MatchConfig::new();
            if let Some(percent) = overrides.required_threshold {
                config
                    .set_required_threshold(percent)
                    .context("apply configuration overrides")?;
            }
            config.seed_from(to, from);
            config
        }
    };
    overrides
        .apply(&mut config)
        .context("apply configuration overrides")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_flags_parse() {
        assert_eq!(
            parse_mapping("name=first + last").unwrap(),
            ColumnMapping {
                column: "name".to_string(),
                sources: vec!["first".to_string(), "last".to_string()],
            }
        );
        assert!(parse_mapping("office=").unwrap().sources.is_empty());
        assert!(parse_mapping("office").is_err());
        assert!(parse_mapping("=office").is_err());
    }

    #[test]
    fn threshold_flags_parse() {
        assert_eq!(
            parse_column_threshold(" name = 80.5").unwrap(),
            ("name".to_string(), 80.5)
        );
        assert!(parse_column_threshold("name=high").is_err());
        assert!(parse_column_threshold("80").is_err());
    }

    #[test]
    fn overrides_replace_sources_and_add_columns() {
        let mut config = MatchConfig::new();
        config.add_column("name", ["name"]).unwrap();
        config.add_column("office", ["office"]).unwrap();

        let overrides = ConfigOverrides {
            mappings: vec![
                parse_mapping("name=first+last").unwrap(),
                parse_mapping("office=").unwrap(),
                parse_mapping("state=st").unwrap(),
            ],
            get_columns: vec!["party".to_string()],
            required_threshold: Some(60.0),
            column_thresholds: vec![("name".to_string(), 90.0)],
            cutoff: true,
        };
        overrides.apply(&mut config).unwrap();

        assert_eq!(config.sources("name").unwrap(), ["first", "last"]);
        assert!(config.sources("office").unwrap().is_empty());
        assert_eq!(config.sources("state").unwrap(), ["st"]);
        assert_eq!(config.column_threshold("name").unwrap(), 90.0);
        assert_eq!(config.column_threshold("state").unwrap(), 60.0);
        assert_eq!(config.get_columns(), ["party"]);
        assert!(config.cutoff());
    }

    #[test]
    fn overrides_use_validated_operations() {
        let mut config = MatchConfig::new();
        let overrides = ConfigOverrides {
            column_thresholds: vec![("missing".to_string(), 50.0)],
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            overrides.apply(&mut config),
            Err(MatchError::NotConfigured(_))
        ));

        let overrides = ConfigOverrides {
            required_threshold: Some(120.0),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            overrides.apply(&mut config),
            Err(MatchError::InvalidThreshold(_))
        ));
    }
}
