//! Person-row aggregation.
//!
//! Walks the person rows below the header block, keeps every product column
//! with a strictly positive quantity, and turns the resulting
//! [`PersonRecord`]s into [`ReportRow`]s for the requested mode.

use crate::models::{Cell, Grid, LineItem, PersonRecord, ProductColumn, ReportMode, ReportRow};

use super::layout::{FIRST_PERSON_ROW, PERSON_NAME_COL};

/// Decimal places kept for money totals.
pub const MONEY_DECIMALS: i32 = 3;
/// Decimal places kept for weight totals.
pub const WEIGHT_DECIMALS: i32 = 2;

/// Collect every person row with at least one positive quantity.
///
/// Rows with a blank or non-text name, and rows whose quantities are all
/// missing, non-numeric or not positive, are skipped.
pub fn collect_persons(grid: &Grid, products: &[ProductColumn]) -> Vec<PersonRecord> {
    (FIRST_PERSON_ROW..grid.height())
        .filter_map(|row| person_at(grid, row, products))
        .collect()
}

fn person_at(grid: &Grid, row: usize, products: &[ProductColumn]) -> Option<PersonRecord> {
    let name = grid.get(row, PERSON_NAME_COL).as_text()?.trim();
    if name.is_empty() {
        return None;
    }

    let items: Vec<LineItem> = products
        .iter()
        .filter_map(|product| {
            read_quantity(grid.get(row, product.index)).map(|quantity| LineItem {
                product: product.clone(),
                quantity,
            })
        })
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(PersonRecord {
        row,
        name: name.to_string(),
        items,
    })
}

/// A usable quantity is a finite number strictly greater than zero.
pub fn read_quantity(cell: &Cell) -> Option<f64> {
    cell.as_number().filter(|q| *q > 0.0)
}

/// Build one report row per person.
pub fn build_rows(persons: &[PersonRecord], mode: ReportMode) -> Vec<ReportRow> {
    persons.iter().map(|p| build_row(p, mode)).collect()
}

fn build_row(person: &PersonRecord, mode: ReportMode) -> ReportRow {
    ReportRow {
        name: person.name.clone(),
        detail: person.detail(),
        total_count: person.total_count(),
        total_money: round_to(person.total_money(), MONEY_DECIMALS),
        total_weight: mode
            .includes_weight()
            .then(|| round_to(person.total_weight(), WEIGHT_DECIMALS)),
    }
}

/// Round to `places` decimals, exact halves to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
