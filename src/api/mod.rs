//! REST API server module
//!
//! Routes:
//! - `GET  /health`
//! - `POST /upload` (multipart CSV in field `file`, or one JSON record)
//! - `GET  /api/highest_volume`
//! - `GET  /api/average_close`
//! - `GET  /api/average_vwap`
//!
//! The aggregation routes take `start_date`, `end_date` and `symbol` query
//! parameters.

pub mod handlers;
mod server;
mod types;

pub use server::{build_router, ApiServer};
pub use types::{BulkInsertReport, FilterParams, UploadParams};
