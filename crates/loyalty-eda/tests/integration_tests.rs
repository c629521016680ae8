//! Integration tests for the loyalty EDA pipeline.
//!
//! These tests run the pipeline end to end on the small loyalty fixtures in
//! `tests/fixtures/`.

use loyalty_eda::analysis::columns::*;
use loyalty_eda::{
    Cleaner, ColumnKind, DisplayOptions, EdaError, OutputFormat, Pipeline, PipelineConfig,
    PipelineResult, PipelineStage, Table, loader, merger, persister,
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config(output_dir: &Path) -> PipelineConfig {
    PipelineConfig::builder()
        .activity_path(fixtures_path().join("Customer_Flight_Activity.csv"))
        .profile_path(fixtures_path().join("Customer_Loyalty_History.csv"))
        .output_dir(output_dir)
        .build()
        .expect("fixture config is valid")
}

/// Integer and text columns must survive a save/load cycle unchanged.
fn assert_reloaded_values(original: &Table, reloaded: &Table) {
    for column in [LOYALTY_NUMBER, PROVINCE, EDUCATION] {
        let expected = original.series(column).unwrap();
        let actual = reloaded.series(column).unwrap();
        assert!(
            expected.equals_missing(actual),
            "column '{}' changed on reload",
            column
        );
    }
}

fn run_fixtures(config: PipelineConfig) -> PipelineResult {
    Pipeline::builder()
        .config(config)
        .build()
        .expect("pipeline builds")
        .run()
        .expect("pipeline runs on fixtures")
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_on_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixtures(fixture_config(dir.path()));

    assert_eq!(result.activity.overview.rows, 28);
    assert_eq!(result.activity.duplicates.duplicate_rows, 1);
    assert_eq!(result.profile.overview.rows, 10);
    assert_eq!(result.profile.nulls.numeric, vec![SALARY, CANCELLATION_YEAR, CANCELLATION_MONTH]);

    let profile = &result.tables.profile;
    assert!(!profile.has_column(COUNTRY));
    assert_eq!(profile.null_count(SALARY).unwrap(), 0);
    assert_eq!(profile.kind(LOYALTY_CARD), Some(ColumnKind::Category));
    assert_eq!(profile.kind(CANCELLATION_MONTH), Some(ColumnKind::DatePart));

    // 28 activity rows for 9 customers, plus one customer without activity
    assert_eq!(result.tables.merged.height(), 29);
    assert!(result.cleaning.steps.iter().any(|s| s.contains("Country")));
}

#[test]
fn test_salary_sign_fixed_and_mean_imputed() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixtures(fixture_config(dir.path()));

    let salaries: Vec<Option<f64>> = result
        .tables
        .profile
        .series(SALARY)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();

    assert!(salaries.iter().flatten().all(|s| *s >= 0.0));
    assert_eq!(salaries[3], Some(63253.0));
    // mean of the eight known salaries after the sign fix, 1 decimal
    assert_eq!(salaries[1], Some(82014.4));
    assert_eq!(salaries[2], Some(82014.4));
}

#[test]
fn test_outputs_written_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixtures(fixture_config(dir.path()));

    assert!(result.all_saved());
    let names: Vec<String> = result
        .saves
        .iter()
        .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Customer_Flight_Activity_limpio.csv",
            "Customer_Loyalty_History_limpio.csv",
            "Customer_Info.csv",
        ]
    );

    let reloaded = loader::load(dir.path().join("Customer_Info.csv"), &DisplayOptions::default())
        .unwrap();
    assert_eq!(reloaded.shape(), result.tables.merged.shape());
    assert_reloaded_values(&result.tables.merged, &reloaded);

    let profile = loader::load(
        dir.path().join("Customer_Loyalty_History_limpio.csv"),
        &DisplayOptions::default(),
    )
    .unwrap();
    assert_reloaded_values(&result.tables.profile, &profile);
}

#[test]
fn test_excel_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .base(fixture_config(dir.path()))
        .output_format(OutputFormat::Excel)
        .run_analysis(false)
        .build()
        .unwrap();
    let result = run_fixtures(config);

    let path = dir.path().join("Customer_Loyalty_History_limpio.xlsx");
    assert!(path.exists());
    let reloaded = loader::load(&path, &DisplayOptions::default()).unwrap();
    assert_eq!(reloaded.shape(), result.tables.profile.shape());
    assert_eq!(reloaded.kind(SALARY), Some(ColumnKind::Float));
    assert_reloaded_values(&result.tables.profile, &reloaded);

    let merged = loader::load(dir.path().join("Customer_Info.xlsx"), &DisplayOptions::default())
        .unwrap();
    assert_reloaded_values(&result.tables.merged, &merged);
}

#[test]
fn test_failed_save_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "occupied").unwrap();

    let result = run_fixtures(fixture_config(&blocker));

    assert_eq!(result.saves.len(), 3);
    assert!(result.saves.iter().all(|s| !s.success));
    assert!(result.analysis.is_some());
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_analysis_on_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixtures(fixture_config(dir.path()));
    let analysis = result.analysis.expect("analysis enabled by default");

    let months: Vec<(i64, i64)> = analysis
        .monthly_flights
        .iter()
        .map(|m| (m.year, m.month))
        .collect();
    assert_eq!(months, vec![(2017, 1), (2017, 2), (2017, 3)]);

    assert_eq!(analysis.distance_vs_points.customers.len(), 9);
    assert!(analysis.distance_vs_points.pearson_r.unwrap() > 0.99);

    let levels: Vec<&str> = analysis
        .flights_by_education
        .groups
        .iter()
        .map(|g| g.group.as_str())
        .collect();
    assert_eq!(
        levels,
        vec!["Bachelor", "College", "Doctor", "High School or Below", "Master"]
    );

    let kw = analysis.kruskal_wallis.expect("five education levels");
    assert_eq!(kw.df, 4);
    assert_eq!(kw.n, 10);
    assert!(kw.p_value > 0.0 && kw.p_value <= 1.0);

    let province_total: usize = analysis.province_distribution.iter().map(|c| c.count).sum();
    assert_eq!(province_total, 10);
    assert_eq!(analysis.province_distribution[0].value, "Ontario");
}

#[test]
fn test_result_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixtures(fixture_config(dir.path()));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["analysis"]["kruskal_wallis"]["p_value"].is_number());
    assert_eq!(json["config"]["output_format"], "csv");
    assert!(json.get("tables").is_none());
}

#[test]
fn test_progress_reaches_complete() {
    let dir = tempfile::tempdir().unwrap();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    Pipeline::builder()
        .config(fixture_config(dir.path()))
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Loading));
    assert!(stages.contains(&PipelineStage::Saving));
    assert!(stages.contains(&PipelineStage::Analyzing));
    assert_eq!(stages.last(), Some(&PipelineStage::Complete));
}

// ============================================================================
// Stage Composition Tests
// ============================================================================

#[test]
fn test_stages_compose_without_pipeline() {
    let display = DisplayOptions::default();
    let activity = loader::load(fixtures_path().join("Customer_Flight_Activity.csv"), &display)
        .unwrap();
    let profile = loader::load(fixtures_path().join("Customer_Loyalty_History.csv"), &display)
        .unwrap();

    let (activity, log) = Cleaner::remove_duplicate_rows(activity, None).unwrap();
    assert_eq!(activity.height(), 27);
    assert_eq!(log.steps.len(), 1);

    let merged = merger::left_join(&profile, &activity, LOYALTY_NUMBER).unwrap();
    assert_eq!(merged.height(), 28);

    let dir = tempfile::tempdir().unwrap();
    let written = persister::save(&merged, dir.path().join("merged"), OutputFormat::Csv).unwrap();
    assert_eq!(written.extension().unwrap(), "csv");
}

#[test]
fn test_unsupported_input_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Customer_Flight_Activity.txt");
    std::fs::write(&path, "Loyalty Number\n1\n").unwrap();

    let err = loader::load(&path, &DisplayOptions::default()).unwrap_err();
    assert!(err.is_unsupported_format());
}

#[test]
fn test_config_from_partial_json() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{ "alpha": 0.01, "output_format": "excel" }"#).unwrap();
    assert_eq!(config.alpha, 0.01);
    assert_eq!(config.output_format, OutputFormat::Excel);
    assert_eq!(config.join_key, "Loyalty Number");

    let invalid = PipelineConfig {
        alpha: 0.0,
        ..config
    };
    let err = Pipeline::builder().config(invalid).build().err().unwrap();
    assert!(matches!(err, EdaError::InvalidConfig(_)));
}
