//! DuckDB migrations

use crate::error::Result;
use duckdb::Connection;

/// Run all DuckDB migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            name VARCHAR PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    run_migration(conn, "001_stock_data", CREATE_STOCK_DATA)?;
    run_migration(conn, "002_stock_data_indexes", CREATE_STOCK_DATA_INDEXES)?;

    tracing::info!("DuckDB migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running DuckDB migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

// No uniqueness on (date, symbol): duplicate bars are kept as uploaded.
// `id` follows insertion order and breaks sort ties.
const CREATE_STOCK_DATA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS stock_data_id_seq START 1;

CREATE TABLE IF NOT EXISTS stock_data (
    id BIGINT PRIMARY KEY DEFAULT nextval('stock_data_id_seq'),
    date VARCHAR NOT NULL,
    symbol VARCHAR NOT NULL,
    series VARCHAR NOT NULL,
    prev_close DOUBLE NOT NULL,
    open DOUBLE NOT NULL,
    high DOUBLE NOT NULL,
    low DOUBLE NOT NULL,
    last DOUBLE NOT NULL,
    close DOUBLE NOT NULL,
    vwap DOUBLE NOT NULL,
    volume DOUBLE NOT NULL,
    turnover DOUBLE NOT NULL,
    trades BIGINT NOT NULL,
    deliverable BIGINT NOT NULL,
    percent_deliverable DOUBLE NOT NULL
);
"#;

const CREATE_STOCK_DATA_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_stock_data_symbol_date ON stock_data(symbol, date);
CREATE INDEX IF NOT EXISTS idx_stock_data_date ON stock_data(date);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 2);
    }
}
