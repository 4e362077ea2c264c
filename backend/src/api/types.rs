//! REST API types for report previews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ProductColumn, ReportMode, ReportRow};
use crate::transform::pipeline::TransformOutput;

/// Message shown when no person qualifies for the report.
pub const EMPTY_REPORT_MESSAGE: &str = "Nothing to report: no person has a positive quantity";

/// Response sent after a roster upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "empty"
    pub status: String,

    /// Human readable note for empty reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Suggested download name for the report workbook
    pub file_name: String,

    pub mode: ReportMode,

    /// Report rows, one per included person
    pub rows: Vec<ReportRow>,

    pub metadata: ReportMetadata,
}

/// Metadata about the transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,

    /// Rows scanned below the header block
    pub scanned_rows: usize,

    /// People included in the report
    pub person_count: usize,

    /// Product columns recognized in the header rows
    pub products: Vec<ProductColumn>,

    /// Size of the report workbook in bytes
    pub artifact_size: usize,
}

impl From<TransformOutput> for PreviewResponse {
    fn from(output: TransformOutput) -> Self {
        let empty = output.is_empty();

        PreviewResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if empty { "empty" } else { "ready" }.to_string(),
            message: empty.then(|| EMPTY_REPORT_MESSAGE.to_string()),
            file_name: output.file_name,
            mode: output.mode,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                scanned_rows: output.analysis.scanned_rows,
                person_count: output.rows.len(),
                products: output.analysis.products,
                artifact_size: output.artifact.len(),
            },
            rows: output.rows,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "rows": [],
    })
}
