//! Report workbook generation.
//!
//! Serializes [`ReportRow`]s into a single-sheet `.xlsx` workbook held in
//! memory: one header row, then one row per person in report order.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::error::TransformResult;
use crate::models::{ReportMode, ReportRow};

/// Name of the generated worksheet.
pub const SHEET_NAME: &str = "Report";

pub const HEADER_NAME: &str = "Name";
pub const HEADER_DETAIL: &str = "(Category) Item × Qty";
pub const HEADER_COUNT: &str = "Total Count";
pub const HEADER_MONEY: &str = "Total Amount";
pub const HEADER_WEIGHT: &str = "Total Weight";

/// Column labels for a mode, in output order.
pub fn headers(mode: ReportMode) -> Vec<&'static str> {
    let mut headers = vec![HEADER_NAME, HEADER_DETAIL, HEADER_COUNT, HEADER_MONEY];
    if mode.includes_weight() {
        headers.push(HEADER_WEIGHT);
    }
    headers
}

struct ReportFormats {
    header: Format,
    text: Format,
    count: Format,
    money: Format,
    weight: Format,
}

impl ReportFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            count: Format::new()
                .set_num_format("0.##")
                .set_border(FormatBorder::Thin),
            money: Format::new()
                .set_num_format("0.000")
                .set_border(FormatBorder::Thin),
            weight: Format::new()
                .set_num_format("0.00")
                .set_border(FormatBorder::Thin),
        }
    }
}

/// Render the report rows to `.xlsx` bytes.
pub fn write_report(rows: &[ReportRow], mode: ReportMode) -> TransformResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = ReportFormats::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    write_header(sheet, mode, &formats)?;

    for (i, row) in rows.iter().enumerate() {
        write_row(sheet, i as u32 + 1, row, &formats)?;
    }

    sheet.set_column_width(0, 16)?;
    sheet.set_column_width(1, 60)?;
    sheet.set_column_width(2, 12)?;
    sheet.set_column_width(3, 14)?;
    if mode.includes_weight() {
        sheet.set_column_width(4, 14)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_header(sheet: &mut Worksheet, mode: ReportMode, formats: &ReportFormats) -> Result<(), XlsxError> {
    for (col, label) in headers(mode).into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, label, &formats.header)?;
    }
    Ok(())
}

fn write_row(sheet: &mut Worksheet, line: u32, row: &ReportRow, formats: &ReportFormats) -> Result<(), XlsxError> {
    sheet.write_string_with_format(line, 0, &row.name, &formats.text)?;
    sheet.write_string_with_format(line, 1, &row.detail, &formats.text)?;
    sheet.write_number_with_format(line, 2, row.total_count, &formats.count)?;
    sheet.write_number_with_format(line, 3, row.total_money, &formats.money)?;
    if let Some(weight) = row.total_weight {
        sheet.write_number_with_format(line, 4, weight, &formats.weight)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use crate::parser::read_workbook;

    fn alice(weight: Option<f64>) -> ReportRow {
        ReportRow {
            name: "Alice".into(),
            detail: "Widget×3".into(),
            total_count: 3.0,
            total_money: 15.0,
            total_weight: weight,
        }
    }

    #[test]
    fn test_headers_per_mode() {
        assert_eq!(headers(ReportMode::Detail).len(), 4);
        assert_eq!(headers(ReportMode::Weight).last(), Some(&HEADER_WEIGHT));
    }

    #[test]
    fn test_report_reads_back() {
        let bytes = write_report(&[alice(Some(6.0))], ReportMode::Weight).unwrap();
        let (grid, sheet) = read_workbook(bytes).unwrap();

        assert_eq!(sheet, SHEET_NAME);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.get(0, 0), &Cell::Text(HEADER_NAME.into()));
        assert_eq!(grid.get(0, 4), &Cell::Text(HEADER_WEIGHT.into()));
        assert_eq!(grid.get(1, 0), &Cell::Text("Alice".into()));
        assert_eq!(grid.get(1, 1), &Cell::Text("Widget×3".into()));
        assert_eq!(grid.get(1, 2), &Cell::Number(3.0));
        assert_eq!(grid.get(1, 3), &Cell::Number(15.0));
        assert_eq!(grid.get(1, 4), &Cell::Number(6.0));
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let bytes = write_report(&[], ReportMode::Detail).unwrap();
        let (grid, _) = read_workbook(bytes).unwrap();
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.width(), 4);
    }
}
