//! Persisted intermediate record files
//!
//! Raw fetched records and the cleaned working set are stored as
//! pretty-printed JSON arrays. A missing file reads as an empty set so
//! downstream steps run on an empty working set instead of aborting.

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use crate::models::Record;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reader/writer for the raw and clean record files
#[derive(Debug, Clone)]
pub struct RecordStore {
    raw_path: PathBuf,
    clean_path: PathBuf,
}

impl RecordStore {
    pub fn new(raw_path: impl Into<PathBuf>, clean_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            clean_path: clean_path.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.raw_path.clone(), config.clean_path.clone())
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn clean_path(&self) -> &Path {
        &self.clean_path
    }

    pub async fn save_raw(&self, records: &[Record]) -> Result<()> {
        write_records(&self.raw_path, records).await?;
        info!(count = records.len(), path = %self.raw_path.display(), "Raw records saved");
        Ok(())
    }

    pub async fn load_raw(&self) -> Result<Vec<Record>> {
        read_records(&self.raw_path).await
    }

    pub async fn save_clean(&self, records: &[Record]) -> Result<()> {
        write_records(&self.clean_path, records).await?;
        info!(count = records.len(), path = %self.clean_path.display(), "Cleaned records saved");
        Ok(())
    }

    pub async fn load_clean(&self) -> Result<Vec<Record>> {
        read_records(&self.clean_path).await
    }
}

async fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error(parent, e))?;
    }

    let body = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| storage_error(path, e))
}

async fn read_records(path: &Path) -> Result<Vec<Record>> {
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Record file not found, using empty set");
            return Ok(Vec::new());
        }
        Err(e) => return Err(storage_error(path, e)),
    };

    serde_json::from_slice(&body).map_err(|e| AppError::InvalidFormat {
        message: format!("{}: {}", path.display(), e),
    })
}

fn storage_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::Storage {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, citations: u64) -> Record {
        Record {
            paper_id: id.to_string(),
            title: Some(format!("Paper {}", id)),
            citation_count: Some(citations),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("raw.json"), dir.path().join("clean.json"));

        let raw = store.load_raw().await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_directories_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(
            dir.path().join("raw/papers.json"),
            dir.path().join("processed/papers_clean.json"),
        );
        let records = vec![record("b", 5), record("a", 50)];

        store.save_clean(&records).await.unwrap();
        let loaded = store.load_clean().await.unwrap();

        assert_eq!(loaded, records);
        assert!(store.load_raw().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.json");
        std::fs::write(&raw, "{not json").unwrap();
        let store = RecordStore::new(raw, dir.path().join("clean.json"));

        let err = store.load_raw().await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }
}
