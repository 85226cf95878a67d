use std::io::{self, IsTerminal};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, trace};

use recmatch_cli::config::{resolve_config, save_config};
use recmatch_cli::logging::redact_value;
use recmatch_cli::pipeline::{
    default_output_path, load_inputs, write_annotated, write_summary_json,
};
use recmatch_engine::{MatchConfig, MatchEngine, MatchError, column_group_percentage, profile};
use recmatch_ingest::read_dataset;

use crate::cli::{ExplainArgs, InitConfigArgs, ProfileArgs, RunArgs};
use crate::summary::{print_explain, print_groups, print_profile, print_run_summary};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub fn run_match(args: &RunArgs, quiet: bool) -> Result<()> {
    let span = info_span!("run", to = %args.datasets.to.display());
    let _guard = span.enter();
    let start = Instant::now();

    // =========================================================================
    // Stage 1: Load datasets and configuration
    // =========================================================================
    let inputs = load_inputs(&args.datasets.to, &args.datasets.from)?;
    let config = resolve_config(
        args.config.config.as_deref(),
        &args.config.overrides(),
        &inputs.to,
        &inputs.from,
    )?;
    if let Some(path) = &args.save_config {
        save_config(path, &config)?;
    }

    // =========================================================================
    // Stage 2: Match
    // =========================================================================
    let progress = (!args.no_progress && !quiet && io::stderr().is_terminal())
        .then(|| progress_bar(inputs.to.row_count()));
    let engine = MatchEngine::new(&config);
    debug!(
        active_columns = engine.config().active_columns().len(),
        get_columns = engine.config().get_columns().len(),
        cutoff = engine.config().cutoff(),
        "starting match"
    );
    let outcome = engine
        .run_with_progress(&inputs.to, &inputs.from, |done, _| {
            if let Some(bar) = &progress {
                bar.set_position(done as u64);
            }
        })
        .map_err(|error| match_error(error, "match datasets"))?;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    // =========================================================================
    // Stage 3: Write outputs
    // =========================================================================
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.datasets.to));
    write_annotated(&output, &outcome, &inputs.to)?;
    if let Some(path) = &args.summary_json {
        write_summary_json(path, &outcome)?;
    }
    info!(
        output = %output.display(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );

    print_run_summary(&outcome, &output, args.summary_json.as_deref());
    Ok(())
}

pub fn run_init_config(args: &InitConfigArgs) -> Result<()> {
    let inputs = load_inputs(&args.datasets.to, &args.datasets.from)?;
    let config = MatchConfig::for_datasets(&inputs.to, &inputs.from);
    save_config(&args.output, &config)?;
    println!(
        "Wrote {} ({} columns, {} active)",
        args.output.display(),
        config.columns().len(),
        config.active_columns().len()
    );
    Ok(())
}

pub fn run_explain(args: &ExplainArgs) -> Result<()> {
    let inputs = load_inputs(&args.datasets.to, &args.datasets.from)?;
    let config = resolve_config(
        args.config.config.as_deref(),
        &args.config.overrides(),
        &inputs.to,
        &inputs.from,
    )?;
    if let Some(record) = inputs.to.record(args.row) {
        for (column, value) in &record {
            trace!(row = args.row, column = %column, value = redact_value(value), "destination cell");
        }
    }
    let candidates = MatchEngine::new(&config)
        .explain_row(&inputs.to, &inputs.from, args.row, args.limit)
        .map_err(|error| match_error(error, &format!("explain destination row {}", args.row)))?;
    debug!(row = args.row, candidates = candidates.len(), "explained row");
    print_explain(args.row, &candidates);
    Ok(())
}

pub fn run_profile(args: &ProfileArgs) -> Result<()> {
    let dataset = read_dataset(&args.file)
        .with_context(|| format!("load dataset {}", args.file.display()))?;
    match &args.column {
        Some(column) => {
            let groups = column_group_percentage(&dataset, column)
                .with_context(|| format!("profile column '{column}'"))?;
            print_groups(column, &groups);
        }
        None => {
            let profiles = profile(&dataset).context("profile dataset")?;
            print_profile(&args.file, dataset.row_count(), &profiles);
        }
    }
    Ok(())
}

/// Points configuration errors at the column to fix.
fn match_error(error: MatchError, action: &str) -> anyhow::Error {
    let context = match (error.is_configuration_error(), error.column()) {
        (true, Some(column)) => format!("{action}: check the configuration for column '{column}'"),
        (true, None) => format!("{action}: check the match configuration"),
        (false, _) => action.to_string(),
    };
    anyhow::Error::new(error).context(context)
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_message("matching rows");
    bar
}
