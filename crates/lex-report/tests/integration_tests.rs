//! Integration tests for the report pipeline.
//!
//! These tests verify end-to-end behavior using the CSV fixtures under
//! `tests/fixtures`.

use lex_report::reporting::{summary_path, write_run_summary};
use lex_report::{
    ClassificationStrategy, DatasetAnalyzer, FieldKind, FieldOutcome, ReportComposer,
    ReportConfig, ReportError, ReportPipeline, ReportStage, RunSummary, TableLoader,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> PathBuf {
    fixtures_path().join(filename)
}

fn pipeline_without_chart() -> ReportPipeline {
    ReportPipeline::builder()
        .config(ReportConfig::builder().render_chart(false).build().unwrap())
        .build()
        .unwrap()
}

fn pdf_page_count(path: &Path) -> usize {
    lopdf::Document::load(path)
        .expect("report should be a readable PDF")
        .get_pages()
        .len()
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_customers_analysis() {
    let table = TableLoader::new().load(&fixture("customers.csv")).unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);

    assert_eq!(analysis.record_count, 6);
    assert_eq!(analysis.field_count, 7);

    let age = analysis.numeric("age").and_then(FieldOutcome::summary).unwrap();
    assert_eq!(age.mean, 38.17);
    assert_eq!(age.median, 36.5);
    assert_eq!(age.min, 28.0);
    assert_eq!(age.max, 52.0);

    // The empty income cell is skipped, not read as zero.
    let income = analysis
        .numeric("income")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(income.mean, 57300.15);
    assert_eq!(income.min, 48000.5);

    // Numeric by its first row, but a later cell is text.
    assert_eq!(
        analysis.numeric("discount").and_then(FieldOutcome::error),
        Some("could not convert string to float: 'n/a'")
    );

    let city = analysis
        .categorical("city")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(city.unique_count, 3);
    assert_eq!(city.most_common_label(), "Boston (3 times)");

    let ids = analysis
        .categorical("customer_id")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(ids.unique_count, 6);
    assert_eq!(ids.most_common_label(), "C001 (1 times)");

    // Every cell of `notes` is empty: classified, but summarized nowhere.
    assert_eq!(
        analysis.classification.kind_of("notes"),
        Some(FieldKind::Categorical)
    );
    assert!(analysis.categorical("notes").is_none());
    assert!(analysis.numeric("notes").is_none());

    let errors = analysis.field_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("discount"));
}

#[test]
fn test_two_row_scenario() {
    let table = TableLoader::new().load(&fixture("people.csv")).unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);

    let age = analysis.numeric("age").and_then(FieldOutcome::summary).unwrap();
    assert_eq!(
        (age.mean, age.median, age.stdev, age.min, age.max),
        (35.0, 35.0, 7.07, 30.0, 40.0)
    );
    let city = analysis
        .categorical("city")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(city.unique_count, 2);
    assert_eq!(city.most_common_label(), "NYC (1 times)");
}

#[test]
fn test_text_in_first_row_makes_field_categorical() {
    let table = TableLoader::new()
        .load(&fixture("first_row_text.csv"))
        .unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);

    assert_eq!(
        analysis.classification.kind_of("score"),
        Some(FieldKind::Categorical)
    );
    let score = analysis
        .categorical("score")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(score.unique_count, 2);
    assert_eq!(score.most_common_label(), "abc (1 times)");
    assert!(analysis.numeric_stats.is_empty());
}

#[test]
fn test_majority_vote_strategy() {
    let table = TableLoader::new()
        .load(&fixture("first_row_text.csv"))
        .unwrap();
    let analysis = DatasetAnalyzer::new(ClassificationStrategy::MajorityVote, 2).analyze(&table);

    // One of two filled cells parses: not a strict majority.
    assert_eq!(
        analysis.classification.kind_of("score"),
        Some(FieldKind::Categorical)
    );
}

#[test]
fn test_custom_delimiter_with_quoted_field() {
    let table = TableLoader::new()
        .with_delimiter(b';')
        .load(&fixture("semicolon.csv"))
        .unwrap();
    assert_eq!(table.width(), 3);
    assert_eq!(
        table.row(0).and_then(|row| row.get("product")),
        Some("Widget; large")
    );

    let analysis = DatasetAnalyzer::default().analyze(&table);
    let price = analysis
        .numeric("price")
        .and_then(FieldOutcome::summary)
        .unwrap();
    assert_eq!(price.max, 19.99);
    assert_eq!(price.median, 7.5);
    assert_eq!(
        analysis
            .categorical("category")
            .and_then(FieldOutcome::summary)
            .map(|s| s.most_common_label()),
        Some("toys (2 times)".to_string())
    );
}

#[test]
fn test_blank_lines_are_not_records() {
    let table = TableLoader::new().load(&fixture("blank_lines.csv")).unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);

    assert_eq!(analysis.record_count, 2);
    // The blank line after the header does not decide the classification.
    assert_eq!(
        analysis.classification.kind_of("age"),
        Some(FieldKind::Numeric)
    );
    let age = analysis.numeric("age").and_then(FieldOutcome::summary).unwrap();
    assert_eq!((age.mean, age.stdev), (35.0, 7.07));
}

#[test]
fn test_ragged_row_keeps_header_width() {
    let table = TableLoader::new().load(&fixture("ragged.csv")).unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);

    assert_eq!(analysis.record_count, 2);
    assert_eq!(analysis.field_count, 2);
    assert_eq!(
        analysis
            .categorical("city")
            .and_then(FieldOutcome::summary)
            .map(|s| s.unique_count),
        Some(2)
    );
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_header_only_aborts_with_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.pdf");

    let result = pipeline_without_chart().run(fixture("header_only.csv"), &output, "Report");

    let error = result.unwrap_err();
    assert!(matches!(error, ReportError::EmptyTable));
    assert_eq!(error.to_string(), "No data found in the file.");
    assert!(!output.exists());
}

#[test]
fn test_missing_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does_not_exist.csv");

    let error = pipeline_without_chart()
        .run(&input, dir.path().join("report.pdf"), "Report")
        .unwrap_err();

    assert!(matches!(error, ReportError::SourceNotFound(_)));
    assert_eq!(error.error_code(), "SOURCE_NOT_FOUND");
    assert!(error.to_string().starts_with("File not found: "));
}

#[test]
fn test_empty_file_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let error = pipeline_without_chart()
        .run(fixture("empty.csv"), dir.path().join("report.pdf"), "Report")
        .unwrap_err();

    assert!(error.is_load_failure());
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_full_report_without_chart() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("customers.pdf");

    let stages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&stages);
    let summary = ReportPipeline::builder()
        .config(ReportConfig::builder().render_chart(false).build().unwrap())
        .on_progress(move |update| seen.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(fixture("customers.csv"), &output, "Customer Overview")
        .unwrap();

    assert!(summary.page_count >= 1);
    assert_eq!(pdf_page_count(&output), summary.page_count);
    assert!(summary.chart_file.is_none());
    assert!(!dir.path().join("customers_chart.png").exists());
    assert_eq!(summary.analysis.field_errors().len(), 1);
    assert_eq!(stages.lock().unwrap().last(), Some(&ReportStage::Complete));
}

#[test]
fn test_report_with_chart_image() {
    let dir = tempfile::tempdir().unwrap();
    let chart = dir.path().join("means.png");
    image::RgbImage::from_pixel(800, 400, image::Rgb([135, 206, 235]))
        .save(&chart)
        .unwrap();
    let output = dir.path().join("report.pdf");

    let table = TableLoader::new().load(&fixture("customers.csv")).unwrap();
    let analysis = DatasetAnalyzer::default().analyze(&table);
    let composer = ReportComposer::default();
    let text_only = composer
        .layout(&analysis, "Data Analysis Report", None)
        .unwrap();
    let document = composer
        .compose(&analysis, "Data Analysis Report", Some(&chart), &output)
        .unwrap();

    assert_eq!(document.page_count(), text_only.page_count() + 1);
    assert_eq!(pdf_page_count(&output), document.page_count());
    let last = document.pages().last().unwrap();
    assert!(last.has_image());
    assert!(last.lines().any(|line| line == "Chart: Mean Values"));

    let lines: Vec<&str> = document.lines().collect();
    for expected in [
        "Summary",
        "Number of records: 6",
        "Number of fields: 7",
        "Numeric Field Statistics",
        "discount: Error - could not convert string to float: 'n/a'",
        "Categorical Field Summaries",
        "  - Most common: Boston (3 times)",
        "Page 2",
    ] {
        assert!(lines.contains(&expected), "missing line: {expected}");
    }
    assert!(!lines.iter().any(|line| line.starts_with("notes")));
}

#[test]
fn test_full_report_with_rendered_chart() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("customers.pdf");

    let summary = ReportPipeline::builder()
        .build()
        .unwrap()
        .run(fixture("customers.csv"), &output, "Data Analysis Report")
        .unwrap();

    let chart = dir.path().join("customers_chart.png");
    assert_eq!(summary.chart_file, Some(chart.display().to_string()));
    assert!(chart.exists());
    assert_eq!(pdf_page_count(&output), summary.page_count);
    assert!(summary.page_count >= 2);
}

#[test]
fn test_run_summary_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("people.pdf");

    let summary = pipeline_without_chart()
        .run(fixture("people.csv"), &output, "People")
        .unwrap();
    let path = summary_path(&output);
    write_run_summary(&summary, &path).unwrap();

    assert_eq!(path, dir.path().join("people_analysis.json"));
    let restored: RunSummary = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored.analysis, summary.analysis);
    assert_eq!(restored.output_file, output.display().to_string());
}
