//! High-level pipeline API for roster to report transformation.
//!
//! This module combines all steps: reading the grid, discovering product
//! columns, aggregating person rows, and writing the report workbook.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::{transform_file, ReportMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = transform_file("roster.xlsx", ReportMode::Weight)?;
//!     std::fs::write(&output.file_name, &output.artifact)?;
//!     println!("{} people in report", output.rows.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::TransformResult;
use crate::models::{Grid, PersonRecord, ProductColumn, ReportMode, ReportRow};
use crate::parser::{parse_bytes, parse_file, InputFormat, ParseResult};
use crate::writer::write_report;

use super::aggregate::{build_rows, collect_persons};
use super::layout::{check_shape, product_columns, FIRST_PERSON_ROW};

/// Base name used when the upload carries no file name.
pub const DEFAULT_BASE_NAME: &str = "roster";

/// Products and people found in a roster, before any report is built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Product columns in column order.
    pub products: Vec<ProductColumn>,
    /// People with at least one positive quantity, in row order.
    pub persons: Vec<PersonRecord>,
    /// Number of rows scanned below the header block.
    pub scanned_rows: usize,
}

/// Result of a complete transformation run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Mode the report was built for
    pub mode: ReportMode,
    /// One row per included person
    pub rows: Vec<ReportRow>,
    /// Report workbook bytes
    pub artifact: Vec<u8>,
    /// Suggested download name, `modified_<base>_<mode>.xlsx`
    pub file_name: String,
    /// Products and people behind the rows
    pub analysis: Analysis,
}

impl TransformOutput {
    /// Zero qualifying people is a valid, empty report.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Discover products and aggregate people without building a report.
pub fn analyze(grid: &Grid) -> TransformResult<Analysis> {
    check_shape(grid)?;
    let products = product_columns(grid)?;
    let persons = collect_persons(grid, &products);

    Ok(Analysis {
        products,
        persons,
        scanned_rows: grid.height().saturating_sub(FIRST_PERSON_ROW),
    })
}

/// Transform a grid into a report.
///
/// `source_name` is the original file name (or base name) used to build the
/// suggested output file name.
pub fn transform(grid: &Grid, mode: ReportMode, source_name: &str) -> TransformResult<TransformOutput> {
    log_info(format!("Grid: {} rows x {} columns", grid.height(), grid.width()));

    let analysis = analyze(grid)?;
    log_success(format!("Found {} product columns", analysis.products.len()));
    for product in &analysis.products {
        log_info_indent(describe_product(product), 1);
    }

    let rows = build_rows(&analysis.persons, mode);
    if rows.is_empty() {
        log_warning(format!(
            "No person with a positive quantity in {} scanned rows",
            analysis.scanned_rows
        ));
    } else {
        log_success(format!(
            "{} of {} rows included in the {} report",
            rows.len(),
            analysis.scanned_rows,
            mode
        ));
    }

    let artifact = write_report(&rows, mode)?;
    let file_name = output_file_name(source_name, mode);
    log_success(format!("Report ready: {} ({} bytes)", file_name, artifact.len()));

    Ok(TransformOutput {
        mode,
        rows,
        artifact,
        file_name,
        analysis,
    })
}

/// Read a roster file and transform it.
pub fn transform_file<P: AsRef<Path>>(path: P, mode: ReportMode) -> TransformResult<TransformOutput> {
    let path = path.as_ref();
    log_info(format!("Reading {}", path.display()));

    let parsed = parse_file(path)?;
    log_parse_result(&parsed);

    transform(&parsed.grid, mode, &path.to_string_lossy())
}

/// Transform an uploaded roster held in memory.
///
/// Same as [`transform_file`] but accepts raw bytes and the upload's name.
pub fn transform_bytes(
    bytes: Vec<u8>,
    file_name: Option<&str>,
    mode: ReportMode,
) -> TransformResult<TransformOutput> {
    log_info(format!(
        "Reading upload {} ({} bytes)",
        file_name.unwrap_or("<unnamed>"),
        bytes.len()
    ));

    let parsed = parse_bytes(bytes, file_name)?;
    log_parse_result(&parsed);

    transform(&parsed.grid, mode, file_name.unwrap_or(DEFAULT_BASE_NAME))
}

/// Build `modified_<base>_<mode>.xlsx` from the original file name.
pub fn output_file_name(source_name: &str, mode: ReportMode) -> String {
    let base = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_NAME);

    format!("modified_{}_{}.xlsx", base, mode.label())
}

fn log_parse_result(parsed: &ParseResult) {
    match parsed.format {
        InputFormat::Workbook => {
            log_success(format!(
                "Read worksheet '{}'",
                parsed.sheet_name.as_deref().unwrap_or("?")
            ));
        }
        InputFormat::Delimited => {
            log_success(format!(
                "Detected encoding: {}",
                parsed.encoding.as_deref().unwrap_or("?")
            ));
            log_success(format!(
                "Detected separator: '{}'",
                parsed.delimiter.map(format_delimiter).unwrap_or_default()
            ));
        }
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn describe_product(product: &ProductColumn) -> String {
    let weight = product
        .weight
        .map(|w| w.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} [{}] weight {} price {}",
        product.name,
        product.category.as_deref().unwrap_or("uncategorized"),
        weight,
        product.unit_price
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::models::Cell;

    /// Scenario grid: Widget (weight 2, price 5), Gadget (price 10), Alice [3, 0].
    fn scenario_a() -> Grid {
        let rows: Vec<Vec<Cell>> = vec![
            vec!["".into(), "".into(), 2.0.into(), "".into()],
            vec![Cell::Empty; 4],
            vec!["".into(), "".into(), "Widget".into(), "Gadget".into()],
            vec!["".into(), "".into(), 5i64.into(), 10i64.into()],
            vec![Cell::Empty; 4],
            vec!["".into(), "Alice".into(), 3i64.into(), 0i64.into()],
        ];
        Grid::new(rows)
    }

    #[test]
    fn test_scenario_a_detail() {
        let output = transform(&scenario_a(), ReportMode::Detail, "orders.xlsx").unwrap();

        assert_eq!(output.rows.len(), 1);
        let row = &output.rows[0];
        assert_eq!(row.name, "Alice");
        assert_eq!(row.detail, "Widget×3");
        assert_eq!(row.total_count, 3.0);
        assert_eq!(row.total_money, 15.0);
        assert_eq!(row.total_weight, None);
        assert_eq!(output.file_name, "modified_orders_detail.xlsx");
        assert!(!output.artifact.is_empty());
    }

    #[test]
    fn test_scenario_a_weight() {
        let output = transform(&scenario_a(), ReportMode::Weight, "orders.xlsx").unwrap();
        assert_eq!(output.rows[0].total_weight, Some(6.0));
        assert_eq!(output.file_name, "modified_orders_weight.xlsx");
    }

    #[test]
    fn test_scenario_b_all_zero_is_empty_not_error() {
        let mut grid_rows: Vec<Vec<Cell>> = scenario_a().rows().map(<[Cell]>::to_vec).collect();
        grid_rows[5][2] = 0i64.into();

        let output = transform(&Grid::new(grid_rows), ReportMode::Detail, "orders.xlsx").unwrap();
        assert!(output.is_empty());
        assert!(output.analysis.persons.is_empty());
        assert_eq!(output.analysis.scanned_rows, 1);
    }

    #[test]
    fn test_scenario_c_gap_hides_later_columns() {
        let rows: Vec<Vec<Cell>> = vec![
            vec![Cell::Empty; 5],
            vec![Cell::Empty; 5],
            vec!["".into(), "".into(), "Widget".into(), "".into(), "Gadget".into()],
            vec!["".into(), "".into(), 1i64.into(), "".into(), 100i64.into()],
            vec![Cell::Empty; 5],
            vec!["".into(), "Alice".into(), 1i64.into(), "".into(), 7i64.into()],
            vec!["".into(), "Bob".into(), "".into(), "".into(), 7i64.into()],
        ];
        let output = transform(&Grid::new(rows), ReportMode::Detail, "x.xlsx").unwrap();

        assert_eq!(output.analysis.products.len(), 1);
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0].detail, "Widget×1");
        assert_eq!(output.rows[0].total_money, 1.0);
    }

    #[test]
    fn test_scenario_d_too_few_rows() {
        let grid = Grid::new(vec![vec![Cell::from("x"); 5]; 4]);
        let err = transform(&grid, ReportMode::Detail, "x.xlsx").unwrap_err();
        assert!(matches!(err, TransformError::MalformedInput(_)));
        assert!(err.to_string().contains("insufficient rows/columns"));
    }

    #[test]
    fn test_rows_are_idempotent() {
        let first = transform(&scenario_a(), ReportMode::Weight, "a.xlsx").unwrap();
        let second = transform(&scenario_a(), ReportMode::Weight, "a.xlsx").unwrap();
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.file_name, second.file_name);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("data/2024 orders.xlsx", ReportMode::Weight), "modified_2024 orders_weight.xlsx");
        assert_eq!(output_file_name("roster.csv", ReportMode::Detail), "modified_roster_detail.xlsx");
        assert_eq!(output_file_name("", ReportMode::Detail), "modified_roster_detail.xlsx");
    }

    #[test]
    fn test_transform_bytes_csv() {
        let csv = ",,2,\n,,,Toys\n,,Widget,Gadget\n,,5,10\n,,,\n,Alice,3,0.5\n,Bob,0,0\n";
        let output = transform_bytes(csv.as_bytes().to_vec(), Some("week1.csv"), ReportMode::Weight).unwrap();

        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0].detail, "Widget×3 / (Toys)Gadget×0.5");
        assert_eq!(output.rows[0].total_money, 20.0);
        assert_eq!(output.rows[0].total_weight, Some(6.0));
        assert_eq!(output.file_name, "modified_week1_weight.xlsx");
    }

    #[test]
    fn test_unreadable_bytes_are_read_failure() {
        let err = transform_bytes(b"PK\x03\x04 broken".to_vec(), Some("x.xlsx"), ReportMode::Detail).unwrap_err();
        assert!(matches!(err, TransformError::ReadFailure(_)));
    }
}
