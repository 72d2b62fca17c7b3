//! Shared test rows

use super::normalizer::RawRow;
use super::schema::FIELDS;

pub const HEADER_LINE: &str =
    "Date,Symbol,Series,Prev Close,Open,High,Low,Last,Close,VWAP,Volume,Turnover,Trades,Deliverable,%Deliverable";

pub const VALID_LINE: &str = "2024-01-02,ABC,EQ,100,101,102,99,100.5,100.5,100.4,1000,100000,50,400,40.0";

/// The canonical valid row, keyed by column name
pub fn sample_row() -> RawRow {
    FIELDS
        .iter()
        .map(|f| f.column())
        .zip(VALID_LINE.split(','))
        .collect()
}

/// `sample_row` with one column overridden
pub fn row_with(column: &str, value: &str) -> RawRow {
    FIELDS
        .iter()
        .map(|f| f.column())
        .zip(VALID_LINE.split(','))
        .map(|(c, v)| (c, if c == column { value } else { v }))
        .collect()
}
