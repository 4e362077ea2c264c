//! Error types for the Tally report pipeline.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`GridError`] - the input could not be read as a grid
//! - [`TransformError`] - top-level pipeline errors
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Grid Reading Errors
// =============================================================================

/// Errors while reading an input file into a [`crate::models::Grid`].
#[derive(Debug, Error)]
pub enum GridError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook container could not be opened or decoded.
    #[error("Cannot open workbook: {0}")]
    Workbook(String),

    /// The workbook has no worksheet to read.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    /// Text content could not be decoded.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Delimited text is malformed.
    #[error("Invalid delimited text at record {record}: {message}")]
    Csv { record: u64, message: String },

    /// File extension is not a supported spreadsheet format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl From<calamine::Error> for GridError {
    fn from(err: calamine::Error) -> Self {
        GridError::Workbook(err.to_string())
    }
}

impl From<csv::Error> for GridError {
    fn from(err: csv::Error) -> Self {
        let record = err.position().map(|p| p.record()).unwrap_or(0);
        GridError::Csv {
            record,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Transform Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error returned by [`crate::transform::pipeline::transform`] and
/// its file/byte variants. Both input variants are terminal for a run: no
/// partial result is ever returned alongside them.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input could not be parsed as a grid at all.
    #[error("Cannot read spreadsheet: {0}")]
    ReadFailure(#[from] GridError),

    /// The grid parsed but violates the fixed layout.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The report workbook could not be produced.
    #[error("Failed to write report: {0}")]
    Artifact(String),
}

impl From<rust_xlsxwriter::XlsxError> for TransformError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        TransformError::Artifact(err.to_string())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for grid reading.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for pipeline operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // GridError -> TransformError
        let grid_err = GridError::NoWorksheet;
        let err: TransformError = grid_err.into();
        assert!(matches!(err, TransformError::ReadFailure(_)));
        assert!(err.to_string().contains("no worksheet"));

        // TransformError -> ServerError keeps the inner message
        let err = TransformError::MalformedInput("no product names found".into());
        let server_err: ServerError = err.into();
        assert!(server_err.to_string().contains("no product names found"));
    }

    #[test]
    fn test_csv_error_format() {
        let err = GridError::Csv {
            record: 4,
            message: "unequal lengths".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("record 4"));
        assert!(msg.contains("unequal lengths"));
    }
}
