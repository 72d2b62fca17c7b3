//! Server configuration from environment variables

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Where stock records are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Root directory for the database and upload spool
    pub data_dir: PathBuf,
    pub db: DbLocation,
    /// Directory uploaded files are spooled into while being ingested
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// Environment variables:
    /// - `BHAVSTORE_HOST` (default: 127.0.0.1)
    /// - `BHAVSTORE_PORT` (default: 3000)
    /// - `BHAVSTORE_DATA_DIR` (default: ./data)
    /// - `BHAVSTORE_DB_PATH` (default: <data_dir>/bhavstore.duckdb, `:memory:` for in-memory)
    /// - `BHAVSTORE_UPLOAD_DIR` (default: <data_dir>/upload)
    /// - `BHAVSTORE_MAX_UPLOAD_BYTES` (default: 64 MiB)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("BHAVSTORE_DATA_DIR").unwrap_or_else(|| "./data".to_string()),
        );

        let port = match lookup("BHAVSTORE_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid BHAVSTORE_PORT '{}': {}", raw, e)))?,
            None => 3000,
        };

        let max_upload_bytes = match lookup("BHAVSTORE_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("Invalid BHAVSTORE_MAX_UPLOAD_BYTES '{}': {}", raw, e))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let db = match lookup("BHAVSTORE_DB_PATH") {
            Some(path) if path == ":memory:" => DbLocation::InMemory,
            Some(path) => DbLocation::File(PathBuf::from(path)),
            None => DbLocation::File(data_dir.join("bhavstore.duckdb")),
        };

        let upload_dir = lookup("BHAVSTORE_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("upload"));

        Ok(Self {
            host: lookup("BHAVSTORE_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            data_dir,
            db,
            upload_dir,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db, DbLocation::File(PathBuf::from("./data/bhavstore.duckdb")));
        assert_eq!(config.upload_dir, PathBuf::from("./data/upload"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("BHAVSTORE_PORT", "8080"),
            ("BHAVSTORE_DB_PATH", ":memory:"),
            ("BHAVSTORE_DATA_DIR", "/srv/bhav"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db, DbLocation::InMemory);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/bhav/upload"));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("BHAVSTORE_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
