//! Stock record storage
//!
//! The ingestion pipeline and the query services only see [`StockStore`].
//! The store enforces no schema of its own; callers validate before inserting.

pub mod duckdb;
pub mod memory;
pub mod models;

use crate::error::Result;
use async_trait::async_trait;
use models::{QueryFilter, SortSpec, StockRecord};

pub use self::duckdb::DuckDb;
pub use memory::MemoryStore;

/// Document store seam used by ingestion and aggregation
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Persist all records, returning how many were written
    async fn insert_many(&self, records: &[StockRecord]) -> Result<usize>;

    /// Records matching `filter`, optionally sorted then truncated to `limit`.
    ///
    /// Without a sort, records come back in insertion order. Sorted results
    /// keep insertion order among equal keys.
    async fn find(
        &self,
        filter: &QueryFilter,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<StockRecord>>;
}
