//! Ingestion of daily bhavcopy rows
//!
//! `source` turns an input into header/row events, `normalizer` and
//! `validator` decide each row, and `pipeline` ties them to the store.

pub mod normalizer;
pub mod numeric;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod validator;

#[cfg(test)]
pub(crate) mod fixtures;

pub use pipeline::{IngestionPipeline, IngestionSummary, PipelineState, RejectionEntry};
pub use source::{single_record, CsvSource, SourceEvent};
pub use validator::RejectReason;
