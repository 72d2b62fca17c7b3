//! Stock record schema descriptor
//!
//! Fixed mapping between the bhavcopy column headers and the stored field names.

/// How a raw column value is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Date,
    Float,
    Integer,
    Text,
}

/// A stored stock record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Symbol,
    Series,
    PrevClose,
    Open,
    High,
    Low,
    Last,
    Close,
    Vwap,
    Volume,
    Turnover,
    Trades,
    Deliverable,
    PercentDeliverable,
}

/// Expected fields, in canonical column order
pub const FIELDS: [Field; 15] = [
    Field::Date,
    Field::Symbol,
    Field::Series,
    Field::PrevClose,
    Field::Open,
    Field::High,
    Field::Low,
    Field::Last,
    Field::Close,
    Field::Vwap,
    Field::Volume,
    Field::Turnover,
    Field::Trades,
    Field::Deliverable,
    Field::PercentDeliverable,
];

impl Field {
    /// Stored field name
    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Symbol => "symbol",
            Field::Series => "series",
            Field::PrevClose => "prev_close",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Last => "last",
            Field::Close => "close",
            Field::Vwap => "vwap",
            Field::Volume => "volume",
            Field::Turnover => "turnover",
            Field::Trades => "trades",
            Field::Deliverable => "deliverable",
            Field::PercentDeliverable => "percent_deliverable",
        }
    }

    /// Header text of the column carrying this field
    pub fn column(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Symbol => "Symbol",
            Field::Series => "Series",
            Field::PrevClose => "Prev Close",
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Last => "Last",
            Field::Close => "Close",
            Field::Vwap => "VWAP",
            Field::Volume => "Volume",
            Field::Turnover => "Turnover",
            Field::Trades => "Trades",
            Field::Deliverable => "Deliverable",
            Field::PercentDeliverable => "%Deliverable",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Field::Date => ValueKind::Date,
            Field::Symbol | Field::Series => ValueKind::Text,
            Field::Trades | Field::Deliverable => ValueKind::Integer,
            _ => ValueKind::Float,
        }
    }
}

/// Required columns absent from `headers`, in canonical order.
///
/// Order-independent subset check; extra headers are ignored.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    FIELDS
        .iter()
        .map(|field| field.column())
        .filter(|column| !headers.iter().any(|h| h.as_ref() == *column))
        .map(str::to_string)
        .collect()
}
