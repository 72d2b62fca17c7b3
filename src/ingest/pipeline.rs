//! Streaming ingestion pipeline
//!
//! Drives one input source through the header gate, the normalizer and the
//! validator, then bulk-inserts the accepted records.
//!
//! ```text
//! AwaitingHeaders ──> Streaming ──> Finalizing ──> Completed
//!        │                │              │
//!        └────────────────┴──────────────┴──────> Failed
//! ```
//!
//! Row-level problems never fail the call; they are collected as
//! [`RejectionEntry`] values. Missing columns, stream errors and store errors
//! fail the whole call and discard everything accumulated so far.

use super::normalizer::{normalize, RawRow};
use super::schema::missing_columns;
use super::source::SourceEvent;
use super::validator::{validate, RejectReason, Verdict};
use crate::db::models::StockRecord;
use crate::db::StockStore;
use crate::error::{AppError, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Pipeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    AwaitingHeaders,
    Streaming,
    Finalizing,
    Completed,
    Failed,
}

/// A rejected row and why it was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionEntry {
    /// 1-based position among all data rows
    pub row: usize,
    pub data: RawRow,
    pub reason: RejectReason,
}

/// Terminal report of one ingestion call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub total_records: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub failed_records: Vec<RejectionEntry>,
}

/// One ingestion call
pub struct IngestionPipeline<'a> {
    id: Uuid,
    store: &'a dyn StockStore,
    state: PipelineState,
    total: usize,
    accepted: Vec<StockRecord>,
    rejected: Vec<RejectionEntry>,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(store: &'a dyn StockStore) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            state: PipelineState::AwaitingHeaders,
            total: 0,
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Consume `source` to completion and persist the accepted rows.
    ///
    /// Returns the summary on `Completed`, or the single fatal error on `Failed`.
    pub async fn run<I>(&mut self, source: I) -> Result<IngestionSummary>
    where
        I: IntoIterator<Item = Result<SourceEvent>>,
    {
        info!("Ingestion {} started", self.id);

        for event in source {
            let step = match event {
                Ok(SourceEvent::Headers(headers)) => self.on_headers(&headers),
                Ok(SourceEvent::Row(row)) => self.on_row(row),
                Err(e) => Err(e),
            };

            if let Err(e) = step {
                return Err(self.fail(e));
            }
        }

        self.finalize().await
    }

    fn on_headers(&mut self, headers: &[String]) -> Result<()> {
        if self.state != PipelineState::AwaitingHeaders {
            return Err(AppError::Stream("unexpected header line after data rows".to_string()));
        }

        let missing = missing_columns(headers);
        if !missing.is_empty() {
            return Err(AppError::Schema { missing });
        }

        self.state = PipelineState::Streaming;
        Ok(())
    }

    fn on_row(&mut self, row: RawRow) -> Result<()> {
        // Headerless shapes (a single structured record) skip the column gate
        self.state = PipelineState::Streaming;
        self.total += 1;

        match validate(normalize(&row)) {
            Verdict::Accept(record) => self.accepted.push(record),
            Verdict::Reject(reason) => {
                debug!("Ingestion {} rejected row {}: {}", self.id, self.total, reason.as_str());
                self.rejected.push(RejectionEntry {
                    row: self.total,
                    data: row,
                    reason,
                });
            }
        }

        Ok(())
    }

    async fn finalize(&mut self) -> Result<IngestionSummary> {
        self.state = PipelineState::Finalizing;

        if !self.accepted.is_empty() {
            if let Err(e) = self.store.insert_many(&self.accepted).await {
                return Err(self.fail(AppError::Persistence(e.to_string())));
            }
        }

        self.state = PipelineState::Completed;

        let summary = IngestionSummary {
            total_records: self.total,
            success_count: self.accepted.len(),
            failed_count: self.rejected.len(),
            failed_records: std::mem::take(&mut self.rejected),
        };
        self.accepted.clear();

        info!(
            "Ingestion {} completed: {} rows, {} accepted, {} rejected",
            self.id, summary.total_records, summary.success_count, summary.failed_count
        );

        Ok(summary)
    }

    /// Move to `Failed`, dropping all partial accounting
    fn fail(&mut self, err: AppError) -> AppError {
        self.state = PipelineState::Failed;
        self.total = 0;
        self.accepted.clear();
        self.rejected.clear();

        match &err {
            AppError::Schema { .. } => warn!("Ingestion {} rejected: {}", self.id, err),
            _ => error!("Ingestion {} failed: {}", self.id, err),
        }

        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{QueryFilter, SortSpec};
    use crate::db::MemoryStore;
    use crate::ingest::fixtures::{row_with, sample_row, HEADER_LINE, VALID_LINE};
    use crate::ingest::source::{single_record, CsvSource};
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl StockStore for FailingStore {
        async fn insert_many(&self, _records: &[StockRecord]) -> Result<usize> {
            Err(AppError::Internal("connection refused".to_string()))
        }

        async fn find(
            &self,
            _filter: &QueryFilter,
            _sort: Option<SortSpec>,
            _limit: Option<usize>,
        ) -> Result<Vec<StockRecord>> {
            Ok(Vec::new())
        }
    }

    fn headers() -> Result<SourceEvent> {
        Ok(SourceEvent::Headers(
            HEADER_LINE.split(',').map(str::to_string).collect(),
        ))
    }

    async fn stored(store: &MemoryStore) -> Vec<StockRecord> {
        store.find(&QueryFilter::default(), None, None).await.unwrap()
    }

    #[tokio::test]
    async fn test_valid_csv_is_inserted() {
        let store = MemoryStore::new();
        let input = format!("{}\n{}\n", HEADER_LINE, VALID_LINE);

        let mut pipeline = IngestionPipeline::new(&store);
        let summary = pipeline
            .run(CsvSource::from_reader(input.as_bytes()))
            .await
            .unwrap();

        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert_eq!(summary.total_records, 1);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 0);

        let records = stored(&store).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].close, 100.5);
    }

    #[tokio::test]
    async fn test_unparseable_volume_is_rejected() {
        let store = MemoryStore::new();
        let events = vec![headers(), Ok(SourceEvent::Row(row_with("Volume", "N/A")))];

        let summary = IngestionPipeline::new(&store).run(events).await.unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failed_records.len(), 1);
        assert_eq!(summary.failed_records[0].reason, RejectReason::InvalidNumericField);
        assert!(stored(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_column_fails_before_any_row() {
        let store = MemoryStore::new();
        let header = HEADER_LINE.replace(",VWAP", "");
        let line = VALID_LINE.replace(",100.4", "");
        let input = format!("{}\n{}\n", header, line);

        let mut pipeline = IngestionPipeline::new(&store);
        let err = pipeline
            .run(CsvSource::from_reader(input.as_bytes()))
            .await
            .unwrap_err();

        assert_eq!(pipeline.state(), PipelineState::Failed);
        match err {
            AppError::Schema { missing } => assert_eq!(missing, vec!["VWAP".to_string()]),
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(stored(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_ordinals_count_every_row() {
        let store = MemoryStore::new();
        let events = vec![
            headers(),
            Ok(SourceEvent::Row(sample_row())),
            Ok(SourceEvent::Row(row_with("Date", "not-a-date"))),
            Ok(SourceEvent::Row(sample_row())),
            Ok(SourceEvent::Row(row_with("Trades", ""))),
        ];

        let summary = IngestionPipeline::new(&store).run(events).await.unwrap();

        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.success_count + summary.failed_count, summary.total_records);
        let rows: Vec<(usize, RejectReason)> = summary
            .failed_records
            .iter()
            .map(|e| (e.row, e.reason))
            .collect();
        assert_eq!(
            rows,
            vec![(2, RejectReason::InvalidDate), (4, RejectReason::InvalidNumericField)]
        );
        assert_eq!(summary.failed_records[0].data.get("Date"), Some("not-a-date"));
    }

    #[tokio::test]
    async fn test_short_rows_are_rejected_not_dropped() {
        let store = MemoryStore::new();
        let input = format!("{}\n2024-01-02,ABC,EQ\n{}\n", HEADER_LINE, VALID_LINE);

        let summary = IngestionPipeline::new(&store)
            .run(CsvSource::from_reader(input.as_bytes()))
            .await
            .unwrap();

        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.failed_records[0].row, 1);
        assert_eq!(summary.failed_records[0].reason, RejectReason::InvalidNumericField);
    }

    #[tokio::test]
    async fn test_stream_error_discards_accumulation() {
        let store = MemoryStore::new();
        let events = vec![
            headers(),
            Ok(SourceEvent::Row(sample_row())),
            Err(AppError::Stream("connection reset".to_string())),
        ];

        let mut pipeline = IngestionPipeline::new(&store);
        let err = pipeline.run(events).await.unwrap_err();

        assert!(matches!(err, AppError::Stream(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert!(stored(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let store = FailingStore;
        let events = vec![headers(), Ok(SourceEvent::Row(sample_row()))];

        let mut pipeline = IngestionPipeline::new(&store);
        let err = pipeline.run(events).await.unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[tokio::test]
    async fn test_all_rejected_skips_insert() {
        // FailingStore would error if insert_many were called
        let store = FailingStore;
        let events = vec![headers(), Ok(SourceEvent::Row(row_with("Open", "x")))];

        let summary = IngestionPipeline::new(&store).run(events).await.unwrap();
        assert_eq!(summary.failed_count, 1);
    }

    #[tokio::test]
    async fn test_reingest_inserts_twice() {
        let store = MemoryStore::new();
        let input = format!("{}\n{}\n", HEADER_LINE, VALID_LINE);

        for _ in 0..2 {
            IngestionPipeline::new(&store)
                .run(CsvSource::from_reader(input.as_bytes()))
                .await
                .unwrap();
        }

        assert_eq!(stored(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn test_single_record_uses_same_validation() {
        let store = MemoryStore::new();
        let payload = json!({
            "date": "2024-01-02", "symbol": "ABC", "series": "EQ",
            "prev_close": 100, "open": 101, "high": 102, "low": 99,
            "last": 100.5, "close": 100.5, "vwap": 100.4, "volume": 1000,
            "turnover": 100000, "trades": 50, "deliverable": 400,
            "percent_deliverable": 40.0
        });

        let summary = IngestionPipeline::new(&store)
            .run(single_record(payload.as_object().unwrap()))
            .await
            .unwrap();
        assert_eq!(summary.success_count, 1);

        let bad = json!({ "date": "soon", "symbol": "ABC" });
        let summary = IngestionPipeline::new(&store)
            .run(single_record(bad.as_object().unwrap()))
            .await
            .unwrap();
        assert_eq!(summary.failed_records[0].reason, RejectReason::InvalidDate);
        assert_eq!(stored(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_upload_completes_with_nothing() {
        let store = MemoryStore::new();
        let summary = IngestionPipeline::new(&store)
            .run(CsvSource::from_reader(&b""[..]))
            .await
            .unwrap();

        assert_eq!(summary, IngestionSummary::default());
    }
}
