//! CLI argument definitions for the record matcher.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use recmatch_cli::config::{
    ColumnMapping, ConfigOverrides, parse_column_threshold, parse_mapping,
};

#[derive(Parser)]
#[command(
    name = "recmatch",
    version,
    about = "Reconcile two tabular datasets that share no key",
    long_about = "Reconcile two tabular datasets that share no key.\n\n\
                  Scores destination rows against source rows across weighted columns\n\
                  and labels each row MATCHED, REVIEW, AMBIGUOUS or UNMATCHED."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match every destination row against the source dataset.
    Run(RunArgs),

    /// Write a starter configuration for two datasets.
    InitConfig(InitConfigArgs),

    /// Show the best source candidates for one destination row.
    Explain(ExplainArgs),

    /// Report uniqueness, blanks and duplicates per column.
    Profile(ProfileArgs),
}

#[derive(Args)]
pub struct DatasetArgs {
    /// Destination dataset (.csv or .tsv) whose rows get labelled.
    #[arg(value_name = "TO")]
    pub to: PathBuf,

    /// Source dataset (.csv or .tsv) searched for candidates.
    #[arg(value_name = "FROM")]
    pub from: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration file (default: one entry per destination column).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Map a destination column to source columns; `DEST=` deactivates it.
    #[arg(long = "map", value_name = "DEST=SRC[+SRC...]", value_parser = parse_mapping)]
    pub mappings: Vec<ColumnMapping>,

    /// Copy a source column into resolved rows.
    #[arg(long = "get", value_name = "COL")]
    pub get_columns: Vec<String>,

    /// Score (0-100) a best candidate needs to resolve.
    #[arg(long = "required-threshold", value_name = "N")]
    pub required_threshold: Option<f64>,

    /// Per-column threshold (0-100).
    #[arg(
        long = "column-threshold",
        value_name = "COL=N",
        value_parser = parse_column_threshold
    )]
    pub column_thresholds: Vec<(String, f64)>,

    /// Ignore a column's score when it falls below the column threshold.
    #[arg(long = "cutoff")]
    pub cutoff: bool,
}

impl ConfigArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mappings: self.mappings.clone(),
            get_columns: self.get_columns.clone(),
            required_threshold: self.required_threshold,
            column_thresholds: self.column_thresholds.clone(),
            cutoff: self.cutoff,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Annotated output file (default: <TO stem>_matched.<ext>).
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the run summary as JSON.
    #[arg(long = "summary-json", value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Save the effective configuration after overrides.
    #[arg(long = "save-config", value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct InitConfigArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    /// Where to write the configuration.
    #[arg(long = "output", value_name = "CONFIG")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Destination row index (0-based).
    #[arg(long = "row", value_name = "N")]
    pub row: usize,

    /// Number of candidates to show.
    #[arg(long = "limit", value_name = "K", default_value_t = 5)]
    pub limit: usize,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Dataset to profile (.csv or .tsv).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show value shares for one column instead of the overview.
    #[arg(long = "column", value_name = "COL")]
    pub column: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_collect_overrides() {
        let cli = Cli::parse_from([
            "recmatch",
            "run",
            "to.csv",
            "from.csv",
            "--map",
            "name=first+last",
            "--map",
            "office=",
            "--get",
            "party",
            "--required-threshold",
            "60",
            "--column-threshold",
            "name=90",
            "--cutoff",
            "-v",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let overrides = args.config.overrides();
        assert_eq!(overrides.mappings.len(), 2);
        assert_eq!(overrides.mappings[0].sources, ["first", "last"]);
        assert_eq!(overrides.get_columns, ["party"]);
        assert_eq!(overrides.required_threshold, Some(60.0));
        assert_eq!(overrides.column_thresholds, [("name".to_string(), 90.0)]);
        assert!(overrides.cutoff);
        assert!(cli.verbosity.is_present());
    }

    #[test]
    fn explain_defaults_limit() {
        let cli = Cli::parse_from(["recmatch", "explain", "to.csv", "from.csv", "--row", "3"]);
        let Command::Explain(args) = cli.command else {
            panic!("expected explain command");
        };
        assert_eq!(args.row, 3);
        assert_eq!(args.limit, 5);
    }
}
