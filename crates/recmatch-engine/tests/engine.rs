//! End-to-end matching runs.

use recmatch_engine::{
    DatasetRole, ErrorKind, MatchConfig, MatchEngine, MatchError, ROW_INDEX_COLUMN,
    STATUS_COLUMN,
};
use recmatch_model::{Dataset, MatchStatus, NO_SCORE};

fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_rows(
        columns.iter().copied(),
        rows.iter()
            .map(|row| row.iter().map(|v| (*v).to_string()).collect())
            .collect(),
    )
    .expect("valid dataset")
}

/// Name-only config with the given required threshold and a column
/// threshold of 100, so anything short of an exact match is REVIEW.
fn name_config(required: f64) -> MatchConfig {
    let mut config = MatchConfig::new();
    config.set_required_threshold(required).unwrap();
    config.add_column("name", ["name"]).unwrap();
    config.set_column_threshold("name", 100.0).unwrap();
    config
}

fn voters() -> Dataset {
    dataset(
        &["name", "office"],
        &[
            &["John Smith", ""],
            &["Jon", ""],
            &["Zachary", ""],
            &["Ann Lee", ""],
        ],
    )
}

fn candidates() -> Dataset {
    dataset(
        &["name", "office"],
        &[
            &["John Smith", "Mayor"],
            &["Jonny", "Clerk"],
            &["Mary", "Judge"],
            &["Ann Lee", "Clerk"],
            &["Ann Lee", "Judge"],
        ],
    )
}

#[test]
fn exact_match_is_matched() {
    let to = dataset(&["name"], &[&["Alice Walker"]]);
    let from = dataset(
        &["name"],
        &[&["Bob Stone"], &["Alice Walker"], &["Carl Young"]],
    );
    let mut config = MatchConfig::new();
    config.set_required_threshold(80.0).unwrap();
    config.add_column("name", ["name"]).unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    let result = &outcome.results[0];
    assert_eq!(result.status, MatchStatus::Matched);
    assert_eq!(result.source_row(), Some(1));
    assert!(result.score.unwrap() >= outcome.optimal_threshold);
    assert!((outcome.optimal_threshold - 0.8).abs() < 1e-12);
}

#[test]
fn score_between_thresholds_needs_review() {
    let to = dataset(&["name"], &[&["Jon"]]);
    let from = dataset(&["name"], &[&["John"], &["Mary"]]);
    let config = name_config(50.0);

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    let result = &outcome.results[0];
    assert_eq!(result.status, MatchStatus::Review);
    assert_eq!(result.source_row(), Some(0));
    assert_eq!(result.score, Some(0.86));
}

#[test]
fn tied_candidates_are_ambiguous() {
    let to = dataset(&["name"], &[&["Ann Lee"]]);
    let mut config = name_config(50.0);
    config.add_get_column("office").unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &candidates()).unwrap();
    let result = &outcome.results[0];
    assert_eq!(result.status, MatchStatus::Ambiguous);
    assert_eq!(result.source_rows, vec![3, 4]);
    assert_eq!(result.score, None);
    assert!(result.copied.is_empty());
}

#[test]
fn best_below_required_is_unmatched() {
    let to = dataset(&["name"], &[&["Zachary"]]);
    let from = dataset(&["name"], &[&["Bob"], &["Ann"]]);
    let config = name_config(90.0);

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    assert_eq!(outcome.results[0].status, MatchStatus::Unmatched);
    assert!(outcome.results[0].source_rows.is_empty());
    assert_eq!(outcome.summary.highest_score, NO_SCORE);
}

#[test]
fn near_spelling_of_multi_word_name_resolves() {
    let to = dataset(&["name"], &[&["Jon Smith"]]);
    let from = dataset(&["name"], &[&["John Smith"]]);
    let mut config = MatchConfig::new();
    config.set_required_threshold(80.0).unwrap();
    config.add_column("name", ["name"]).unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    let result = &outcome.results[0];
    assert!(result.status.is_resolved());
    assert!(result.score.unwrap() >= 0.8);
}

#[test]
fn zero_required_threshold_never_leaves_rows_unmatched() {
    let config = name_config(0.0);
    let outcome = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap();
    assert!(
        outcome
            .results
            .iter()
            .all(|r| r.status != MatchStatus::Unmatched)
    );
}

#[test]
fn classifies_a_mixed_batch_and_summarizes() {
    let mut config = name_config(60.0);
    config.add_get_column("office").unwrap();

    let outcome = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap();
    let statuses: Vec<MatchStatus> = outcome.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            MatchStatus::Matched,
            MatchStatus::Review,
            MatchStatus::Unmatched,
            MatchStatus::Ambiguous,
        ]
    );

    let summary = &outcome.summary;
    assert_eq!(summary.optimal, 1);
    assert_eq!(summary.review, 1);
    assert_eq!(summary.ambiguous, 1);
    assert_eq!(summary.unmatched, 1);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.total, 4);
    assert!((summary.average_score - 0.875).abs() < 1e-9);
    assert_eq!(summary.highest_score, 1.0);
    assert_eq!(summary.lowest_score, 0.75);
}

#[test]
fn annotate_appends_match_columns() {
    let mut config = name_config(60.0);
    config.add_get_column("office").unwrap();
    let to = voters();

    let outcome = MatchEngine::new(&config).run(&to, &candidates()).unwrap();
    let annotated = outcome.annotate(&to).unwrap();

    assert_eq!(
        annotated.columns(),
        [
            "name",
            "office",
            "match_status",
            "match_score",
            "row_index",
            "office_source"
        ]
    );
    let cells = |row: usize| annotated.row(row).unwrap()[2..].to_vec();
    assert_eq!(cells(0), ["MATCHED", "1.00", "0", "Mayor"]);
    assert_eq!(cells(1), ["REVIEW", "0.75", "1", "Clerk"]);
    assert_eq!(cells(2), ["UNMATCHED", "", "", ""]);
    assert_eq!(cells(3), ["AMBIGUOUS", "", "3,4", ""]);
    assert_eq!(annotated.value(3, ROW_INDEX_COLUMN), Some("3,4"));
    assert_eq!(annotated.value(0, STATUS_COLUMN), Some("MATCHED"));
}

#[test]
fn annotating_a_previous_output_overwrites_match_columns() {
    let mut config = name_config(60.0);
    config.add_get_column("office").unwrap();
    let first = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap()
        .annotate(&voters())
        .unwrap();

    let rerun = MatchEngine::new(&config).run(&first, &candidates()).unwrap();
    let annotated = rerun.annotate(&first).unwrap();
    assert_eq!(
        annotated.columns(),
        [
            "name",
            "office",
            "match_status",
            "match_score",
            "row_index",
            "office_source",
            "office_source_source"
        ]
    );
    assert_eq!(annotated.value(1, STATUS_COLUMN), Some("REVIEW"));
    assert_eq!(annotated.value(3, ROW_INDEX_COLUMN), Some("3,4"));
    assert_eq!(annotated.value(0, "office_source_source"), Some("Mayor"));
}

#[test]
fn weights_follow_destination_uniqueness() {
    let to = dataset(
        &["name", "state"],
        &[&["Ann Lee", "KS"], &["Bob Ray", "KS"]],
    );
    let from = dataset(&["full_name", "state"], &[&["Ann Lee", "KS"]]);
    let mut config = MatchConfig::new();
    config.add_column("name", ["full_name"]).unwrap();
    config.add_column("state", ["state"]).unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    assert!((outcome.weights["name"] - 2.0 / 3.0).abs() < 1e-12);
    assert!((outcome.weights["state"] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(outcome.results[0].status, MatchStatus::Matched);
}

#[test]
fn composite_source_text_joins_mapped_columns() {
    let to = dataset(&["name"], &[&["Ann Lee"]]);
    let from = dataset(&["first", "last"], &[&["Ann", "Lee"], &["Ann", "Ray"]]);
    let mut config = MatchConfig::new();
    config.add_column("name", ["first", "last"]).unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    assert_eq!(outcome.results[0].source_row(), Some(0));
    assert_eq!(outcome.results[0].score, Some(1.0));
}

fn cutoff_datasets() -> (Dataset, Dataset) {
    let to = dataset(&["name", "state"], &[&["Jon", "KS"]]);
    let from = dataset(&["name", "state"], &[&["Jon", "MO"], &["Jonny", "KS"]]);
    (to, from)
}

fn cutoff_config(enabled: bool) -> MatchConfig {
    let mut config = MatchConfig::new();
    config.set_required_threshold(40.0).unwrap();
    config.add_column("name", ["name"]).unwrap();
    config.add_column("state", ["state"]).unwrap();
    config.set_column_threshold("name", 100.0).unwrap();
    config.set_column_threshold("state", 100.0).unwrap();
    config.set_cutoff(enabled);
    config
}

#[test]
fn cutoff_prunes_per_column() {
    let (to, from) = cutoff_datasets();

    let without = MatchEngine::new(&cutoff_config(false))
        .run(&to, &from)
        .unwrap();
    assert_eq!(without.results[0].status, MatchStatus::Review);
    assert_eq!(without.results[0].source_row(), Some(1));

    // Each source row keeps exactly one exact column, so they tie.
    let with = MatchEngine::new(&cutoff_config(true))
        .run(&to, &from)
        .unwrap();
    assert_eq!(with.results[0].status, MatchStatus::Ambiguous);
    assert_eq!(with.results[0].source_rows, vec![0, 1]);
}

#[test]
fn rows_pruned_in_every_column_are_not_candidates() {
    let to = dataset(&["name", "state"], &[&["Jon", "KS"]]);
    let from = dataset(&["name", "state"], &[&["Zed", "MO"]]);
    let mut config = cutoff_config(true);
    config.set_required_threshold(0.0).unwrap();

    let outcome = MatchEngine::new(&config).run(&to, &from).unwrap();
    assert_eq!(outcome.results[0].status, MatchStatus::Unmatched);
}

#[test]
fn runs_are_deterministic() {
    let mut config = name_config(60.0);
    config.add_get_column("office").unwrap();
    let engine = MatchEngine::new(&config);

    let first = engine.run(&voters(), &candidates()).unwrap();
    let second = engine.run(&voters(), &candidates()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn reports_progress_per_row() {
    let config = name_config(60.0);
    let mut calls = Vec::new();
    MatchEngine::new(&config)
        .run_with_progress(&voters(), &candidates(), |done, total| {
            calls.push((done, total));
        })
        .unwrap();
    assert_eq!(calls, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[test]
fn empty_source_leaves_every_row_unmatched() {
    let config = name_config(0.0);
    let from = dataset(&["name", "office"], &[]);

    let outcome = MatchEngine::new(&config).run(&voters(), &from).unwrap();
    assert_eq!(outcome.summary.unmatched, 4);
    assert_eq!(outcome.summary.scored, 0);
    assert_eq!(outcome.summary.average_score, 0.0);
    assert_eq!(outcome.summary.lowest_score, NO_SCORE);
    assert!(outcome.weights.is_empty());
}

#[test]
fn empty_destination_completes_trivially() {
    let config = name_config(0.0);
    let to = dataset(&["name"], &[]);

    let outcome = MatchEngine::new(&config).run(&to, &candidates()).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.summary.total, 0);
    assert_eq!(outcome.annotate(&to).unwrap().row_count(), 0);
}

#[test]
fn rejects_configuration_without_active_columns() {
    let mut config = MatchConfig::new();
    config.add_column("name", Vec::<String>::new()).unwrap();

    let err = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap_err();
    assert_eq!(err, MatchError::NoActiveColumns);
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn rejects_unknown_get_column() {
    let mut config = name_config(50.0);
    config.add_get_column("party").unwrap();

    let err = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap_err();
    assert_eq!(err, MatchError::UnknownGetColumn("party".to_string()));
}

#[test]
fn schema_drift_is_a_data_shape_error() {
    let mut config = MatchConfig::new();
    config.add_column("name", ["full_name"]).unwrap();

    let err = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::MissingColumn {
            role: DatasetRole::Source,
            column: "full_name".to_string(),
        }
    );
    assert_eq!(err.kind(), ErrorKind::DataShape);
}

#[test]
fn destination_drift_is_reported_before_source_drift() {
    let mut config = MatchConfig::new();
    config.add_column("nickname", ["alias"]).unwrap();

    let err = MatchEngine::new(&config)
        .run(&voters(), &candidates())
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::MissingColumn {
            role: DatasetRole::Destination,
            column: "nickname".to_string(),
        }
    );
    assert_eq!(err.kind(), ErrorKind::DataShape);
    assert_eq!(err.column(), Some("nickname"));
    assert!(!err.is_configuration_error());
}

#[test]
fn configuration_errors_win_over_empty_datasets() {
    let config = MatchConfig::new();
    let to = dataset(&["name"], &[]);
    let err = MatchEngine::new(&config).run(&to, &to).unwrap_err();
    assert_eq!(err, MatchError::NoActiveColumns);
}

#[test]
fn explains_candidates_best_first() {
    let config = name_config(60.0);
    let engine = MatchEngine::new(&config);

    let explained = engine
        .explain_row(&voters(), &candidates(), 1, 2)
        .unwrap();
    assert_eq!(explained.len(), 2);
    assert_eq!(explained[0].source_row, 1);
    assert_eq!(explained[0].score, 0.75);
    assert_eq!(explained[1].source_row, 0);
    assert_eq!(explained[0].explain(), "name: 75% x 1.00");

    let err = engine
        .explain_row(&voters(), &candidates(), 9, 2)
        .unwrap_err();
    assert_eq!(err, MatchError::RowOutOfRange { row: 9, rows: 4 });
}
