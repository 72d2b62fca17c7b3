//! Services Layer
//!
//! Business logic called by the HTTP handlers.
//!
//! # Services
//!
//! - `IngestService` - CSV uploads and single records into the store
//! - `AggregationService` - Highest volume, average close, average VWAP

pub mod aggregation_service;
pub mod ingest_service;

pub use aggregation_service::{build_filter, AggregationService, HighestVolume};
pub use ingest_service::IngestService;
