mod common;

use common::{APPLE_CIK, read_fixture_bytes};
use edgarsum::{SelectionOptions, Submission, filter_forms, parse_catalog, take_limit};

fn catalog() -> Vec<edgarsum::FilingRecord> {
    parse_catalog(APPLE_CIK, &read_fixture_bytes("submissions/catalog.json")).unwrap()
}

#[test]
fn parse_submission_catalog() {
    let submission: Submission =
        serde_json::from_slice(&read_fixture_bytes("submissions/catalog.json")).unwrap();
    assert_eq!(submission.name.as_deref(), Some("Apple Inc."));
    assert_eq!(submission.tickers, vec!["AAPL"]);

    let rows = catalog();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].form, "10-Q");
    assert_eq!(rows[0].accession_compact, "000032019324000069");
    assert_eq!(rows[0].report_period.as_deref(), Some("2024-03-30"));
    assert!(rows.iter().all(|r| r.cik10 == APPLE_CIK));
}

#[test]
fn empty_report_date_is_absent() {
    let rows = catalog();
    assert_eq!(rows[1].form, "8-K");
    assert!(rows[1].report_period.is_none());
}

#[test]
fn select_annual_reports() {
    let selected = SelectionOptions::new().with_form_type("10-K").apply(catalog());
    let accessions: Vec<&str> = selected.iter().map(|r| r.accession.as_str()).collect();
    assert_eq!(accessions, vec!["0000320193-23-000106", "0000320193-22-000108"]);
}

#[test]
fn select_with_amendments_and_limit() {
    let selected = SelectionOptions::new()
        .with_form_type("10-k")
        .with_include_amendments(true)
        .with_limit(2)
        .apply(catalog());
    let forms: Vec<&str> = selected.iter().map(|r| r.form.as_str()).collect();
    assert_eq!(forms, vec!["10-K/A", "10-K"]);
}

#[test]
fn select_multiple_forms_keeps_catalog_order() {
    let selected = SelectionOptions::new()
        .with_form_types(["10-K", "10-Q"])
        .apply(catalog());
    let forms: Vec<&str> = selected.iter().map(|r| r.form.as_str()).collect();
    assert_eq!(forms, vec!["10-Q", "10-K", "10-Q", "10-K"]);
}

#[test]
fn no_forms_means_every_form() {
    assert_eq!(filter_forms(catalog(), &[] as &[&str]).len(), 6);
    assert_eq!(SelectionOptions::new().apply(catalog()).len(), 5);
}

#[test]
fn limit_edges() {
    assert!(take_limit(catalog(), 0).is_empty());
    assert_eq!(take_limit(catalog(), 100).len(), 6);
}
