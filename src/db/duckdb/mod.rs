//! DuckDB-backed stock record store

mod migrations;

use super::models::{QueryFilter, SortOrder, SortSpec, StockRecord};
use super::StockStore;
use crate::error::Result;
use async_trait::async_trait;
use duckdb::{Connection, ToSql};
use parking_lot::Mutex;
use std::path::Path;

const SELECT_COLUMNS: &str = "date, symbol, series, prev_close, open, high, low, last, close, \
     vwap, volume, turnover, trades, deliverable, percent_deliverable";

/// DuckDB database wrapper
pub struct DuckDb {
    conn: Mutex<Connection>,
}

impl DuckDb {
    /// Open (or create) a database file
    pub fn new(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    /// Insert records in a single transaction
    fn insert_records(&self, records: &[StockRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();

        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(&format!(
            "INSERT INTO stock_data ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            SELECT_COLUMNS
        ))?;

        let mut count = 0;
        for r in records {
            stmt.execute(duckdb::params![
                r.date,
                r.symbol,
                r.series,
                r.prev_close,
                r.open,
                r.high,
                r.low,
                r.last,
                r.close,
                r.vwap,
                r.volume,
                r.turnover,
                r.trades,
                r.deliverable,
                r.percent_deliverable,
            ])?;
            count += 1;
        }

        drop(stmt);
        tx.commit()?;

        Ok(count)
    }

    /// Query records matching a filter
    fn query_records(
        &self,
        filter: &QueryFilter,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<StockRecord>> {
        let mut clauses = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        // Dates are stored as ISO strings, so lexical order is date order
        if let Some(start) = filter.start_date {
            clauses.push("date >= ?");
            params.push(Box::new(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = filter.end_date {
            clauses.push("date <= ?");
            params.push(Box::new(end.format("%Y-%m-%d").to_string()));
        }
        if let Some(symbol) = &filter.symbol {
            clauses.push("symbol = ?");
            params.push(Box::new(symbol.clone()));
        }

        let mut sql = format!("SELECT {} FROM stock_data", SELECT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        match sort {
            Some(SortSpec { field, order }) => {
                let direction = match order {
                    SortOrder::Ascending => "ASC",
                    SortOrder::Descending => "DESC",
                };
                sql.push_str(&format!(" ORDER BY {} {}, id ASC", field.name(), direction));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;

        let params_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(StockRecord {
                    date: row.get(0)?,
                    symbol: row.get(1)?,
                    series: row.get(2)?,
                    prev_close: row.get(3)?,
                    open: row.get(4)?,
                    high: row.get(5)?,
                    low: row.get(6)?,
                    last: row.get(7)?,
                    close: row.get(8)?,
                    vwap: row.get(9)?,
                    volume: row.get(10)?,
                    turnover: row.get(11)?,
                    trades: row.get(12)?,
                    deliverable: row.get(13)?,
                    percent_deliverable: row.get(14)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

#[async_trait]
impl StockStore for DuckDb {
    async fn insert_many(&self, records: &[StockRecord]) -> Result<usize> {
        self.insert_records(records)
    }

    async fn find(
        &self,
        filter: &QueryFilter,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<StockRecord>> {
        self.query_records(filter, sort, limit)
    }
}
