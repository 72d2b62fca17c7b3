//! Row sources feeding the ingestion pipeline
//!
//! A source is an iterator of [`SourceEvent`]s: an optional header event, then
//! rows, then end-of-input (`None`). An `Err` item is a stream-level failure.

use super::normalizer::RawRow;
use super::schema::FIELDS;
use crate::error::{AppError, Result};
use csv::{ReaderBuilder, StringRecord};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One structural event from an input stream
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// Column names of the input, in file order
    Headers(Vec<String>),
    Row(RawRow),
}

/// Comma-delimited UTF-8 text with a header line
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Option<Vec<String>>,
    record: StringRecord,
    done: bool,
}

impl CsvSource<File> {
    /// Open a spooled upload for reading
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| AppError::Stream(format!("open '{}': {}", path.display(), e)))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        // Short and long rows are tolerated; their fields are validated per row
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        Self {
            reader,
            headers: None,
            record: StringRecord::new(),
            done: false,
        }
    }

    fn stream_error(&mut self, err: csv::Error) -> Option<Result<SourceEvent>> {
        self.done = true;
        Some(Err(AppError::Stream(err.to_string())))
    }

    fn read_headers(&mut self) -> Option<Result<SourceEvent>> {
        let headers: Vec<String> = match self.reader.headers() {
            Ok(record) => record.iter().map(str::to_string).collect(),
            Err(e) => return self.stream_error(e),
        };

        // Zero-byte input has no header line at all
        if headers.is_empty() {
            self.done = true;
            return None;
        }

        self.headers = Some(headers.clone());
        Some(Ok(SourceEvent::Headers(headers)))
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<SourceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.headers.is_none() {
            return self.read_headers();
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let headers = self.headers.as_deref().unwrap_or_default();
                let row = headers
                    .iter()
                    .zip(self.record.iter())
                    .map(|(column, value)| (column.as_str(), value))
                    .collect();
                Some(Ok(SourceEvent::Row(row)))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => self.stream_error(e),
        }
    }
}

/// A single structured record supplied directly.
///
/// Keys may be header names (`"Prev Close"`) or field names (`"prev_close"`).
/// Numbers and strings become raw strings; other JSON types count as absent.
pub fn single_record(payload: &Map<String, Value>) -> impl Iterator<Item = Result<SourceEvent>> {
    let row: RawRow = FIELDS
        .iter()
        .filter_map(|field| {
            let value = payload
                .get(field.column())
                .or_else(|| payload.get(field.name()))?;
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((field.column(), raw))
        })
        .collect();

    std::iter::once(Ok(SourceEvent::Row(row)))
}
