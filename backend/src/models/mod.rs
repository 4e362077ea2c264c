//! Domain models for the Tally report pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Cell`] / [`Grid`] - The typed input grid read from a spreadsheet
//! - [`ProductColumn`] - Metadata of one product column in the header rows
//! - [`PersonRecord`] / [`LineItem`] - One person's non-zero quantities
//! - [`ReportRow`] - One output row of the report
//! - [`ReportMode`] - Which report variant to build

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Cell
// =============================================================================

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// Any numeric value (integers are widened).
    Number(f64),
    /// Text typed as text in the source.
    Text(String),
    /// Booleans, dates and durations in display form. Never read as text.
    Other(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Numeric value, if this is a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Other(_) => false,
        }
    }

    /// Trimmed display form of the cell (empty string for blank cells).
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) | Cell::Other(s) => s.trim().to_string(),
            Cell::Number(n) => format_quantity(*n),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

/// Render a number without a decimal point when it is whole.
///
/// `3.0` renders as `"3"`, `2.5` as `"2.5"`.
pub fn format_quantity(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Grid
// =============================================================================

/// An immutable rectangular grid of cells addressed by zero-based `(row, col)`.
///
/// Rows shorter than the widest row are padded with [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// Build a grid from rows of cells.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; out-of-bounds positions read as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl From<Vec<Vec<Cell>>> for Grid {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Grid::new(rows)
    }
}

// =============================================================================
// Product Column
// =============================================================================

/// One product column of the roster, built from the header rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColumn {
    /// Zero-based column index in the grid.
    pub index: usize,
    /// Product name (never empty).
    pub name: String,
    /// Category label; `None` means uncategorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Weight per unit; `None` when the header cell is not a positive number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Price per unit, `0` when missing.
    pub unit_price: f64,
}

impl ProductColumn {
    /// Label used in the detail string, e.g. `(Snacks)Widget×3`.
    pub fn label(&self, quantity: f64) -> String {
        match &self.category {
            Some(category) => format!("({}){}×{}", category, self.name, format_quantity(quantity)),
            None => format!("{}×{}", self.name, format_quantity(quantity)),
        }
    }
}

// =============================================================================
// Person Record
// =============================================================================

/// A product a person ordered, with a strictly positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: ProductColumn,
    pub quantity: f64,
}

impl LineItem {
    /// `quantity × unit_price`
    pub fn amount(&self) -> f64 {
        self.quantity * self.product.unit_price
    }

    /// `quantity × weight`, or 0 when the product has no weight.
    pub fn weight(&self) -> f64 {
        self.product.weight.map_or(0.0, |w| self.quantity * w)
    }
}

/// One person row of the roster with at least one line item.
///
/// Totals are always derived from the line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// Zero-based row index in the grid.
    pub row: usize,
    /// Trimmed person name.
    pub name: String,
    /// Line items in product-column order.
    pub items: Vec<LineItem>,
}

impl PersonRecord {
    /// Sum of quantities.
    pub fn total_count(&self) -> f64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of `quantity × unit_price`, unrounded.
    pub fn total_money(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }

    /// Sum of `quantity × weight` over weighted products, unrounded.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(LineItem::weight).sum()
    }

    /// Line item labels joined with `" / "`.
    pub fn detail(&self) -> String {
        self.items
            .iter()
            .map(|i| i.product.label(i.quantity))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

// =============================================================================
// Report
// =============================================================================

/// Report variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Per-person detail, count and money.
    #[default]
    Detail,
    /// Detail plus total weight.
    Weight,
}

impl ReportMode {
    /// Label used in generated file names.
    pub fn label(&self) -> &'static str {
        match self {
            ReportMode::Detail => "detail",
            ReportMode::Weight => "weight",
        }
    }

    pub fn includes_weight(&self) -> bool {
        matches!(self, ReportMode::Weight)
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a mode string is neither `detail` nor `weight`.
#[derive(Debug, Clone, Error)]
#[error("unknown report mode '{0}' (expected 'detail' or 'weight')")]
pub struct UnknownModeError(pub String);

impl FromStr for ReportMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detail" => Ok(ReportMode::Detail),
            "weight" => Ok(ReportMode::Weight),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// One row of the generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    /// Joined `(category)name×qty` labels.
    pub detail: String,
    pub total_count: f64,
    /// Rounded to 3 decimals.
    pub total_money: f64,
    /// Rounded to 2 decimals; only present in weight mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
}
