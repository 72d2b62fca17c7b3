//! HTTP request and response types

use crate::ingest::IngestionSummary;
use crate::services::HighestVolume;
use serde::{Deserialize, Serialize};

/// Query string of `POST /upload`
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// `rows` selects the per-row report
    pub report: Option<String>,
}

impl UploadParams {
    pub fn wants_row_report(&self) -> bool {
        self.report.as_deref() == Some("rows")
    }
}

/// Query string shared by the aggregation endpoints
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub symbol: Option<String>,
}

/// Default upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInsertReport {
    pub message: String,
    pub total_records: usize,
    pub success_count: usize,
    pub failed_count: usize,
}

impl From<&IngestionSummary> for BulkInsertReport {
    fn from(summary: &IngestionSummary) -> Self {
        Self {
            message: "Data successfully uploaded".to_string(),
            total_records: summary.total_records,
            success_count: summary.success_count,
            failed_count: summary.failed_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighestVolumeResponse {
    pub highest_volume: HighestVolume,
}

#[derive(Debug, Serialize)]
pub struct AverageCloseResponse {
    pub average_close: f64,
}

#[derive(Debug, Serialize)]
pub struct AverageVwapResponse {
    pub average_vwap: f64,
}

/// Body of a 404 from the aggregation endpoints
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub error: &'static str,
}

impl Default for NotFoundResponse {
    fn default() -> Self {
        Self {
            error: "No records found for the given criteria.",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
