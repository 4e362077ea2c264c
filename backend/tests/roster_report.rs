//! End-to-end tests: roster workbook on disk -> report workbook.

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;
use tally::{parse_bytes, transform_file, Cell, ReportMode, TransformError};
use tempfile::tempdir;

/// Write a roster with three products (a gap after the third) and four people.
fn write_roster(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    // Weight row: Tea has no weight.
    sheet.write_number(0, 2, 0.25).unwrap();
    sheet.write_string(0, 3, "n/a").unwrap();
    sheet.write_number(0, 4, 1.5).unwrap();
    // Category row
    sheet.write_string(1, 2, "Snacks").unwrap();
    sheet.write_string(1, 4, "Drinks").unwrap();
    // Name row, gap at column 5, ignored column 6
    sheet.write_string(2, 2, "Cookie").unwrap();
    sheet.write_string(2, 3, "Tea").unwrap();
    sheet.write_string(2, 4, "Juice").unwrap();
    sheet.write_string(2, 6, "Hidden").unwrap();
    // Price row
    sheet.write_number(3, 2, 1.2).unwrap();
    sheet.write_number(3, 3, 3).unwrap();
    sheet.write_number(3, 4, 2.5).unwrap();
    sheet.write_number(3, 6, 99).unwrap();

    sheet.write_string(5, 1, "Alice").unwrap();
    sheet.write_number(5, 2, 4).unwrap();
    sheet.write_number(5, 3, 1).unwrap();
    sheet.write_number(5, 6, 10).unwrap();

    sheet.write_string(6, 1, "Bob").unwrap();
    sheet.write_number(6, 2, 0).unwrap();
    sheet.write_number(6, 6, 10).unwrap();

    sheet.write_string(7, 1, "Carol").unwrap();
    sheet.write_number(7, 4, 0.5).unwrap();
    sheet.write_string(7, 3, "two").unwrap();

    // No name: skipped even with quantities.
    sheet.write_number(8, 2, 7).unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn test_weight_report_from_workbook() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("march.xlsx");
    write_roster(&input);

    let output = transform_file(&input, ReportMode::Weight).unwrap();
    assert_eq!(output.file_name, "modified_march_weight.xlsx");
    assert_eq!(output.analysis.products.len(), 3);

    let names: Vec<_> = output.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Carol"]);

    let alice = &output.rows[0];
    assert_eq!(alice.detail, "(Snacks)Cookie×4 / Tea×1");
    assert_eq!(alice.total_count, 5.0);
    assert_eq!(alice.total_money, 7.8);
    assert_eq!(alice.total_weight, Some(1.0));

    let carol = &output.rows[1];
    assert_eq!(carol.detail, "(Drinks)Juice×0.5");
    assert_eq!(carol.total_money, 1.25);
    assert_eq!(carol.total_weight, Some(0.75));
}

#[test]
fn test_artifact_matches_rows() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("march.xlsx");
    write_roster(&input);

    let output = transform_file(&input, ReportMode::Detail).unwrap();
    let report = parse_bytes(output.artifact.clone(), Some(&output.file_name)).unwrap();

    assert_eq!(report.grid.height(), output.rows.len() + 1);
    assert_eq!(report.grid.width(), 4);
    assert_eq!(report.grid.get(1, 0), &Cell::Text("Alice".into()));
    assert_eq!(report.grid.get(1, 3), &Cell::Number(7.8));
    assert_eq!(report.grid.get(2, 1), &Cell::Text("(Drinks)Juice×0.5".into()));
}

#[test]
fn test_missing_file_is_read_failure() {
    let dir = tempdir().unwrap();
    let err = transform_file(dir.path().join("absent.xlsx"), ReportMode::Detail).unwrap_err();
    assert!(matches!(err, TransformError::ReadFailure(_)));
}

#[test]
fn test_header_only_workbook_is_malformed() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("short.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(2, 2, "Cookie").unwrap();
    sheet.write_number(3, 2, 1).unwrap();
    workbook.save(&input).unwrap();

    let err = transform_file(&input, ReportMode::Detail).unwrap_err();
    assert!(matches!(err, TransformError::MalformedInput(_)));
}

#[test]
fn test_boolean_and_date_names_are_skipped() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("typed.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(2, 2, "Widget").unwrap();
    sheet.write_number(3, 2, 2).unwrap();

    sheet.write_boolean(5, 1, true).unwrap();
    sheet.write_number(5, 2, 3).unwrap();

    let date = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    sheet.write_datetime_with_format(6, 1, &date, &date_format).unwrap();
    sheet.write_number(6, 2, 4).unwrap();

    sheet.write_string(7, 1, "Alice").unwrap();
    sheet.write_number(7, 2, 1).unwrap();
    workbook.save(&input).unwrap();

    let output = transform_file(&input, ReportMode::Detail).unwrap();
    let names: Vec<_> = output.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alice"]);
    assert_eq!(output.analysis.scanned_rows, 3);
}
