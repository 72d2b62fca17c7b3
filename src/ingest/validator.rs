//! Candidate record validation
//!
//! Checks run in a fixed order and the first failure wins, so every rejected
//! row carries exactly one reason:
//! 1. date parseability
//! 2. numeric fields
//! 3. required text fields

use super::normalizer::CandidateRecord;
use crate::db::models::StockRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Why a row was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    InvalidDate,
    InvalidNumericField,
    MissingRequiredField,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::InvalidDate => "invalid-date",
            RejectReason::InvalidNumericField => "invalid-numeric-field",
            RejectReason::MissingRequiredField => "missing-required-field",
        }
    }
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept(StockRecord),
    Reject(RejectReason),
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a calendar date from the formats bhavcopy exports commonly use
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Decide whether a candidate record is accepted
pub fn validate(candidate: CandidateRecord) -> Verdict {
    let Some(date) = parse_calendar_date(&candidate.date) else {
        return Verdict::Reject(RejectReason::InvalidDate);
    };

    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

    let numbers = (|| {
        Some((
            finite(candidate.prev_close)?,
            finite(candidate.open)?,
            finite(candidate.high)?,
            finite(candidate.low)?,
            finite(candidate.last)?,
            finite(candidate.close)?,
            finite(candidate.vwap)?,
            finite(candidate.volume)?,
            finite(candidate.turnover)?,
            candidate.trades?,
            candidate.deliverable?,
            finite(candidate.percent_deliverable)?,
        ))
    })();

    let Some((
        prev_close,
        open,
        high,
        low,
        last,
        close,
        vwap,
        volume,
        turnover,
        trades,
        deliverable,
        percent_deliverable,
    )) = numbers
    else {
        return Verdict::Reject(RejectReason::InvalidNumericField);
    };

    if candidate.symbol.trim().is_empty() || candidate.series.trim().is_empty() {
        return Verdict::Reject(RejectReason::MissingRequiredField);
    }

    Verdict::Accept(StockRecord {
        date: date.format("%Y-%m-%d").to_string(),
        symbol: candidate.symbol,
        series: candidate.series,
        prev_close,
        open,
        high,
        low,
        last,
        close,
        vwap,
        volume,
        turnover,
        trades,
        deliverable,
        percent_deliverable,
    })
}
