//! Application state management

use crate::config::{DbLocation, ServerConfig};
use crate::db::{DuckDb, MemoryStore, StockStore};
use crate::error::Result;
use crate::storage::UploadStorage;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Stock record store
    pub store: Arc<dyn StockStore>,

    /// Spool directory for uploads in flight
    pub uploads: UploadStorage,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        tracing::info!("Data directory: {:?}", config.data_dir);

        let store: Arc<dyn StockStore> = match &config.db {
            DbLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::info!("Opening DuckDB store at {:?}", path);
                Arc::new(DuckDb::new(path)?)
            }
            DbLocation::InMemory => {
                tracing::info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let uploads = UploadStorage::new(&config.upload_dir)?;

        Ok(Self::with_store(store, uploads))
    }

    /// Assemble state from an existing store
    pub fn with_store(store: Arc<dyn StockStore>, uploads: UploadStorage) -> Self {
        Self { store, uploads }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let uploads = UploadStorage::new(std::env::temp_dir().join("bhavstore-tests"))
            .expect("test upload dir");
        Self::with_store(Arc::new(MemoryStore::new()), uploads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::QueryFilter;

    #[tokio::test]
    async fn test_new_opens_duckdb_file_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::from_lookup(|key| match key {
            "BHAVSTORE_DATA_DIR" => Some(dir.path().to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap();

        let state = AppState::new(&config).unwrap();

        assert!(dir.path().join("bhavstore.duckdb").exists());
        assert!(dir.path().join("upload").is_dir());
        let found = state.store.find(&QueryFilter::default(), None, None).await.unwrap();
        assert!(found.is_empty());
    }
}
