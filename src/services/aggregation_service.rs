//! Aggregation Service
//!
//! Read-only statistics over stored records: highest volume, average close
//! and average VWAP.

use crate::db::models::{QueryFilter, SortSpec, StockRecord};
use crate::error::{AppError, Result};
use crate::ingest::schema::Field;
use crate::ingest::validator::parse_calendar_date;
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// The record with the largest volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighestVolume {
    pub date: String,
    pub symbol: String,
    pub volume: f64,
}

/// Build a filter from raw request parameters. Empty values count as absent.
pub fn build_filter(
    start_date: Option<&str>,
    end_date: Option<&str>,
    symbol: Option<&str>,
) -> Result<QueryFilter> {
    Ok(QueryFilter {
        start_date: parse_bound("start_date", start_date)?,
        end_date: parse_bound("end_date", end_date)?,
        symbol: present(symbol).map(str::to_string),
    })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match present(raw) {
        Some(s) => parse_calendar_date(s)
            .map(Some)
            .ok_or_else(|| AppError::InvalidFilter(format!("{} '{}' is not a date", name, s))),
        None => Ok(None),
    }
}

fn mean(records: &[StockRecord], value: impl Fn(&StockRecord) -> f64) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(value).sum();
    Some(total / records.len() as f64)
}

/// Aggregation service for business logic
pub struct AggregationService;

impl AggregationService {
    /// Record with the highest volume; ties go to the earliest stored
    pub async fn highest_volume(
        state: &AppState,
        filter: &QueryFilter,
    ) -> Result<Option<HighestVolume>> {
        info!("AggregationService::highest_volume - {:?}", filter);

        let top = state
            .store
            .find(filter, Some(SortSpec::descending(Field::Volume)), Some(1))
            .await?;

        Ok(top.into_iter().next().map(|r| HighestVolume {
            date: r.date,
            symbol: r.symbol,
            volume: r.volume,
        }))
    }

    /// Mean close for one symbol
    pub async fn average_close(state: &AppState, filter: &QueryFilter) -> Result<Option<f64>> {
        info!("AggregationService::average_close - {:?}", filter);

        if filter.symbol.is_none() {
            return Err(AppError::MissingFilter("Symbol"));
        }

        let records = state.store.find(filter, None, None).await?;
        Ok(mean(&records, |r| r.close))
    }

    /// Mean VWAP, optionally for one symbol
    pub async fn average_vwap(state: &AppState, filter: &QueryFilter) -> Result<Option<f64>> {
        info!("AggregationService::average_vwap - {:?}", filter);

        let records = state.store.find(filter, None, None).await?;
        Ok(mean(&records, |r| r.vwap))
    }
}
