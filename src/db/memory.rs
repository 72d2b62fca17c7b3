//! In-process stock record store
//!
//! Selected with `BHAVSTORE_DB_PATH=:memory:`. Records live only as long as
//! the process.

use super::models::{QueryFilter, SortOrder, SortSpec, StockRecord};
use super::StockStore;
use crate::error::Result;
use crate::ingest::schema::{Field, ValueKind};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;

/// Vec-backed store; insertion order is the natural order
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StockRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &StockRecord, b: &StockRecord, field: Field) -> Ordering {
    match field.kind() {
        ValueKind::Date | ValueKind::Text => text_value(a, field).cmp(text_value(b, field)),
        ValueKind::Float | ValueKind::Integer => {
            numeric_value(a, field).total_cmp(&numeric_value(b, field))
        }
    }
}

fn text_value(r: &StockRecord, field: Field) -> &str {
    match field {
        Field::Symbol => &r.symbol,
        Field::Series => &r.series,
        _ => &r.date,
    }
}

fn numeric_value(r: &StockRecord, field: Field) -> f64 {
    match field {
        Field::PrevClose => r.prev_close,
        Field::Open => r.open,
        Field::High => r.high,
        Field::Low => r.low,
        Field::Last => r.last,
        Field::Close => r.close,
        Field::Vwap => r.vwap,
        Field::Volume => r.volume,
        Field::Turnover => r.turnover,
        Field::Trades => r.trades as f64,
        Field::Deliverable => r.deliverable as f64,
        Field::PercentDeliverable => r.percent_deliverable,
        Field::Date | Field::Symbol | Field::Series => 0.0,
    }
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn insert_many(&self, records: &[StockRecord]) -> Result<usize> {
        self.records.write().extend_from_slice(records);
        Ok(records.len())
    }

    async fn find(
        &self,
        filter: &QueryFilter,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<StockRecord>> {
        let mut matched: Vec<StockRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among ties
        if let Some(SortSpec { field, order }) = sort {
            matched.sort_by(|a, b| match order {
                SortOrder::Ascending => compare(a, b, field),
                SortOrder::Descending => compare(b, a, field),
            });
        }

        if let Some(limit) = limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(symbol: &str, volume: f64) -> StockRecord {
        StockRecord {
            date: "2024-01-02".to_string(),
            symbol: symbol.to_string(),
            series: "EQ".to_string(),
            prev_close: 1.0,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            last: 1.0,
            close: 1.0,
            vwap: 1.0,
            volume,
            turnover: 1.0,
            trades: 1,
            deliverable: 1,
            percent_deliverable: 1.0,
        }
    }

    #[tokio::test]
    async fn test_descending_sort_is_stable() {
        let store = MemoryStore::new();
        store
            .insert_many(&[bar("A", 5.0), bar("B", 9.0), bar("C", 9.0)])
            .await
            .unwrap();

        let sorted = store
            .find(&QueryFilter::default(), Some(SortSpec::descending(Field::Volume)), None)
            .await
            .unwrap();
        let symbols: Vec<&str> = sorted.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_limit_and_filter() {
        let store = MemoryStore::new();
        store
            .insert_many(&[bar("A", 1.0), bar("B", 2.0), bar("A", 3.0)])
            .await
            .unwrap();

        let found = store
            .find(&QueryFilter::for_symbol("A"), None, Some(1))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].volume, 1.0);
    }
}
