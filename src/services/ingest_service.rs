//! Ingest Service
//!
//! Runs the ingestion pipeline over spooled CSV uploads and single JSON
//! records.

use crate::error::Result;
use crate::ingest::{single_record, CsvSource, IngestionPipeline, IngestionSummary};
use crate::state::AppState;
use crate::storage::UploadArtifact;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// Ingestion entry points shared by the upload handlers
pub struct IngestService;

impl IngestService {
    /// Ingest a spooled CSV upload, releasing the artifact afterwards
    pub async fn ingest_artifact(
        state: &AppState,
        mut artifact: UploadArtifact,
    ) -> Result<IngestionSummary> {
        let result = match artifact.path() {
            Some(path) => Self::ingest_csv_file(state, path).await,
            None => Ok(IngestionSummary::default()),
        };

        artifact.release();
        result
    }

    /// Ingest a CSV file from disk
    pub async fn ingest_csv_file(state: &AppState, path: &Path) -> Result<IngestionSummary> {
        info!("IngestService::ingest_csv_file - {}", path.display());

        let source = CsvSource::from_path(path)?;
        IngestionPipeline::new(state.store.as_ref()).run(source).await
    }

    /// Ingest one structured record
    pub async fn ingest_record(
        state: &AppState,
        payload: &Map<String, Value>,
    ) -> Result<IngestionSummary> {
        info!("IngestService::ingest_record - {} keys", payload.len());

        IngestionPipeline::new(state.store.as_ref())
            .run(single_record(payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::QueryFilter;
    use crate::ingest::fixtures::{HEADER_LINE, VALID_LINE};
    use std::io::Write;

    fn csv() -> String {
        let bad = VALID_LINE.replace(",1000,", ",N/A,");
        format!("{}\n{}\n{}\n", HEADER_LINE, VALID_LINE, bad)
    }

    #[tokio::test]
    async fn test_artifact_is_removed_after_success() {
        let state = AppState::for_tests();
        let artifact = state.uploads.acquire("bhav.csv").unwrap();
        let path = artifact.path().unwrap().to_path_buf();
        artifact.reopen().unwrap().write_all(csv().as_bytes()).unwrap();

        let summary = IngestService::ingest_artifact(&state, artifact).await.unwrap();

        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.success_count, 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_artifact_is_removed_after_failure() {
        let state = AppState::for_tests();
        let artifact = state.uploads.acquire("bad.csv").unwrap();
        let path = artifact.path().unwrap().to_path_buf();
        artifact.reopen().unwrap().write_all(b"Date,Symbol\n2024-01-02,ABC\n").unwrap();

        let err = IngestService::ingest_artifact(&state, artifact).await.unwrap_err();

        assert_eq!(err.code(), "SCHEMA_ERROR");
        assert!(!path.exists());
        let stored = state.store.find(&QueryFilter::default(), None, None).await.unwrap();
        assert!(stored.is_empty());
    }
}
