//! Raw row to candidate record coercion

use super::numeric::{parse_float_prefix, parse_int_prefix};
use super::schema::Field;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One unparsed input row: column name to raw string, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell; a repeated column keeps its first value
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        if self.get(&column).is_none() {
            self.cells.push((column, value.into()));
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A raw row after type coercion, not yet validated.
///
/// `None` marks a numeric value that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub date: String,
    pub symbol: String,
    pub series: String,
    pub prev_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub last: Option<f64>,
    pub close: Option<f64>,
    pub vwap: Option<f64>,
    pub volume: Option<f64>,
    pub turnover: Option<f64>,
    pub trades: Option<i64>,
    pub deliverable: Option<i64>,
    pub percent_deliverable: Option<f64>,
}

/// Coerce a raw row into a candidate record. Never fails.
pub fn normalize(row: &RawRow) -> CandidateRecord {
    let text = |field: Field| row.get(field.column()).unwrap_or_default().to_string();
    let float = |field: Field| row.get(field.column()).and_then(parse_float_prefix);
    let int = |field: Field| row.get(field.column()).and_then(parse_int_prefix);

    CandidateRecord {
        date: text(Field::Date),
        symbol: text(Field::Symbol),
        series: text(Field::Series),
        prev_close: float(Field::PrevClose),
        open: float(Field::Open),
        high: float(Field::High),
        low: float(Field::Low),
        last: float(Field::Last),
        close: float(Field::Close),
        vwap: float(Field::Vwap),
        volume: float(Field::Volume),
        turnover: float(Field::Turnover),
        trades: int(Field::Trades),
        deliverable: int(Field::Deliverable),
        percent_deliverable: float(Field::PercentDeliverable),
    }
}
