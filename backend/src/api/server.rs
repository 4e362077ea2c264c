//! HTTP Server for the Tally API.
//!
//! Accepts a roster upload plus a report mode and either previews the report
//! as JSON or returns the report workbook for download.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/preview`    | Upload roster, get report rows       |
//! | POST   | `/api/export`     | Upload roster, get report `.xlsx`    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//!
//! Uploads are `multipart/form-data` with a `file` field and an optional
//! `mode` field (`detail` or `weight`, default `detail`).

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, PreviewResponse};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult, TransformError};
use crate::models::ReportMode;
use crate::transform::pipeline::{transform_bytes, TransformOutput};

/// MIME type of the report workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

type ApiError = (StatusCode, Json<Value>);

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);
    let addr = config.socket_addr();

    println!("🚀 Tally server running on http://{}", addr);
    println!("   POST /api/preview - Upload roster, preview report");
    println!("   POST /api/export  - Upload roster, download report");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/preview", post(preview))
        .route("/api/export", post(export))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tally",
        "version": env!("CARGO_PKG_VERSION"),
        "modes": ["detail", "weight"],
        "endpoints": {
            "preview": "POST /api/preview",
            "export": "POST /api/export",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers just skip the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Preview endpoint: report rows as JSON
async fn preview(multipart: Multipart) -> Result<Json<PreviewResponse>, ApiError> {
    let output = run_upload(multipart).await.map_err(into_api_error)?;
    Ok(Json(PreviewResponse::from(output)))
}

/// Export endpoint: report workbook as an attachment
async fn export(multipart: Multipart) -> Result<Response, ApiError> {
    let output = run_upload(multipart).await.map_err(into_api_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&output.file_name))
        .map_err(|e| into_api_error(ServerError::Internal(e.to_string())))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, output.artifact).into_response())
}

/// An uploaded roster with its requested mode.
struct Upload {
    bytes: Vec<u8>,
    file_name: Option<String>,
    mode: ReportMode,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut mode = ReportMode::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                bytes = Some(data.to_vec());
            }
            "mode" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                mode = text
                    .parse::<ReportMode>()
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    Ok(Upload {
        bytes,
        file_name,
        mode,
    })
}

async fn run_upload(multipart: Multipart) -> ServerResult<TransformOutput> {
    let upload = read_upload(multipart).await?;

    log_info(format!(
        "📄 New upload: {} ({} bytes, {} mode)",
        upload.file_name.as_deref().unwrap_or("unknown"),
        upload.bytes.len(),
        upload.mode
    ));

    let Upload {
        bytes,
        file_name,
        mode,
    } = upload;

    let output = tokio::task::spawn_blocking(move || transform_bytes(bytes, file_name.as_deref(), mode))
        .await
        .map_err(|e| ServerError::Internal(format!("Transform task failed: {}", e)))??;

    Ok(output)
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Transform(TransformError::ReadFailure(_))
        | ServerError::Transform(TransformError::MalformedInput(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::Transform(TransformError::Artifact(_)) | ServerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn into_api_error(err: ServerError) -> ApiError {
    log_error(err.to_string());
    (status_for(&err), Json(error_response(&err.to_string())))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}
