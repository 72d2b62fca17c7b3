//! Stored record and query models

use crate::ingest::schema::Field;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily trading bar for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    pub date: String,
    pub symbol: String,
    pub series: String,
    pub prev_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub last: f64,
    pub close: f64,
    pub vwap: f64,
    pub volume: f64,
    pub turnover: f64,
    pub trades: i64,
    pub deliverable: i64,
    pub percent_deliverable: f64,
}

/// Date range and symbol constraints applied before aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Inclusive lower bound
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end_date: Option<NaiveDate>,
    /// Exact match
    pub symbol: Option<String>,
}

impl QueryFilter {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    /// Whether a stored record satisfies this filter
    pub fn matches(&self, record: &StockRecord) -> bool {
        let iso = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();

        if let Some(start) = &self.start_date {
            if record.date < iso(start) {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if record.date > iso(end) {
                return false;
            }
        }
        match &self.symbol {
            Some(symbol) => &record.symbol == symbol,
            None => true,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort applied by the store before any limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Field,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn descending(field: Field) -> Self {
        Self {
            field,
            order: SortOrder::Descending,
        }
    }
}
