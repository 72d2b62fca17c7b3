//! HTTP endpoint handlers
//!
//! Provides handlers for:
//! - CSV and JSON ingestion (/upload)
//! - Aggregation queries (/api/*)

use crate::api::types::*;
use crate::error::{AppError, Result};
use crate::services::{build_filter, AggregationService, IngestService};
use crate::state::AppState;
use crate::storage::UploadArtifact;
use axum::{
    extract::{FromRequest, Json, Multipart, Query, Request, State as AxumState},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const UPLOAD_FIELD: &str = "file";

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint - GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        message: "bhavstore API is running",
    })
}

// ============================================================================
// Upload
// ============================================================================

/// Ingestion endpoint - POST /upload
///
/// `multipart/form-data` with a `.csv` file in field `file`, or a single
/// JSON record. `?report=rows` returns the per-row report.
pub async fn upload(
    AxumState(state): AxumState<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let summary = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadUpload(e.body_text()))?;
        let artifact = spool_upload(&state, multipart).await?;
        IngestService::ingest_artifact(&state, artifact).await?
    } else if content_type.starts_with("application/json") {
        let Json(payload) = Json::<Value>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadUpload(e.body_text()))?;
        let Value::Object(record) = payload else {
            return Err(no_upload());
        };
        IngestService::ingest_record(&state, &record).await?
    } else {
        return Err(no_upload());
    };

    info!(
        "Upload ingested: {} rows, {} accepted",
        summary.total_records, summary.success_count
    );

    let response = if params.wants_row_report() {
        (StatusCode::CREATED, Json(summary)).into_response()
    } else {
        (StatusCode::CREATED, Json(BulkInsertReport::from(&summary))).into_response()
    };

    Ok(response)
}

fn no_upload() -> AppError {
    AppError::BadUpload("No file uploaded or invalid format".to_string())
}

/// Write the `file` field of a multipart body to a spool file
async fn spool_upload(state: &AppState, mut multipart: Multipart) -> Result<UploadArtifact> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Stream(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(AppError::BadUpload("Only CSV files are allowed".to_string()));
        }

        // Dropping the artifact on any error below removes the partial file
        let artifact = state.uploads.acquire(&file_name)?;
        let mut out = tokio::fs::File::from_std(artifact.reopen()?);
        let mut written = 0usize;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Stream(e.body_text()))?
        {
            out.write_all(&chunk).await?;
            written += chunk.len();
        }
        out.flush().await?;

        debug!("Spooled {} bytes of '{}'", written, file_name);
        return Ok(artifact);
    }

    Err(no_upload())
}

// ============================================================================
// Aggregation API
// ============================================================================

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(NotFoundResponse::default())).into_response()
}

/// Highest volume record - GET /api/highest_volume
pub async fn highest_volume(
    AxumState(state): AxumState<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Response> {
    let filter = build_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.symbol.as_deref(),
    )?;

    Ok(match AggregationService::highest_volume(&state, &filter).await? {
        Some(highest_volume) => Json(HighestVolumeResponse { highest_volume }).into_response(),
        None => not_found(),
    })
}

/// Average closing price of one symbol - GET /api/average_close
pub async fn average_close(
    AxumState(state): AxumState<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Response> {
    let filter = build_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.symbol.as_deref(),
    )?;

    Ok(match AggregationService::average_close(&state, &filter).await? {
        Some(average_close) => Json(AverageCloseResponse { average_close }).into_response(),
        None => not_found(),
    })
}

/// Average VWAP - GET /api/average_vwap
pub async fn average_vwap(
    AxumState(state): AxumState<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Response> {
    let filter = build_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.symbol.as_deref(),
    )?;

    Ok(match AggregationService::average_vwap(&state, &filter).await? {
        Some(average_vwap) => Json(AverageVwapResponse { average_vwap }).into_response(),
        None => not_found(),
    })
}
