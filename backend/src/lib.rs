//! # Tally - roster spreadsheet to per-person reports
//!
//! Tally reads a fixed-layout roster spreadsheet (people × product quantities,
//! with weight/category/name/price header rows) and produces a per-person
//! report, either with detail, count and money (`detail` mode) or with total
//! weight as well (`weight` mode).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Roster file │────▶│   Parser    │────▶│  Transform  │────▶│ Report xlsx │
//! │ (xlsx/csv)  │     │   (Grid)    │     │ (aggregate) │     │  + rows     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally::{transform_file, ReportMode};
//!
//! let output = transform_file("roster.xlsx", ReportMode::Detail).unwrap();
//! println!("{} people, saved as {}", output.rows.len(), output.file_name);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Grid, product, person and report models
//! - [`parser`] - Spreadsheet and delimited text reading
//! - [`transform`] - Layout, aggregation and pipeline
//! - [`writer`] - Report workbook output
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

// HTTP API
pub mod api;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{GridError, ServerError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Cell,
    Grid,
    LineItem,
    PersonRecord,
    ProductColumn,
    ReportMode,
    ReportRow,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{parse_bytes, parse_file, InputFormat, ParseResult};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze,
    output_file_name,
    transform,
    transform_bytes,
    transform_file,
    Analysis,
    TransformOutput,
};

pub use writer::write_report;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, PreviewResponse, ReportMetadata};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
