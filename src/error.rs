//! Application error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Error saving data to the database: {0}")]
    Persistence(String),

    #[error("{0} is required")]
    MissingFilter(&'static str),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("{0}")]
    BadUpload(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Schema { .. } => "SCHEMA_ERROR",
            AppError::Stream(_) => "STREAM_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::MissingFilter(_) => "MISSING_REQUIRED_FILTER",
            AppError::InvalidFilter(_) => "INVALID_FILTER",
            AppError::BadUpload(_) => "BAD_UPLOAD",
            AppError::DuckDb(_) => "DUCKDB_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Schema { .. }
            | AppError::MissingFilter(_)
            | AppError::InvalidFilter(_)
            | AppError::BadUpload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serializable error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "error")]
    pub message: String,
    pub code: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
