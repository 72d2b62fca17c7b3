//! Spool files for uploaded CSV input
//!
//! An upload is written to disk while it arrives, ingested from there, and
//! removed once the request is done with it.

use crate::error::{AppError, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

/// Hands out spool files under a single directory
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    /// Use `dir` for spooling, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty spool file for an upload named `original_name`
    pub fn acquire(&self, original_name: &str) -> Result<UploadArtifact> {
        let prefix = format!(
            "{}-{}-",
            Utc::now().timestamp_millis(),
            sanitize(original_name)
        );

        let file = Builder::new()
            .prefix(&prefix)
            .suffix(".csv")
            .tempfile_in(&self.dir)?;

        debug!("Spooling upload '{}' to {}", original_name, file.path().display());

        Ok(UploadArtifact { file: Some(file) })
    }
}

/// Keep only characters that are safe in a file name
fn sanitize(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// A spooled upload; the file is deleted on release or drop
#[derive(Debug)]
pub struct UploadArtifact {
    file: Option<NamedTempFile>,
}

impl UploadArtifact {
    /// Path of the spool file, `None` once released
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Reopen the spool file for writing from another handle
    pub fn reopen(&self) -> Result<fs::File> {
        match &self.file {
            Some(f) => Ok(f.reopen()?),
            None => Err(AppError::Internal("upload artifact already released".to_string())),
        }
    }

    /// Delete the spool file. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };

        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            warn!("Failed to remove upload artifact {}: {}", path.display(), e);
        }
    }
}

impl Drop for UploadArtifact {
    fn drop(&mut self) {
        self.release();
    }
}
