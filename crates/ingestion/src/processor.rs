//! Ingestion processor
//!
//! Core pipeline: fetch raw records, persist them, then reload and reduce
//! them to the cleaned working set the graph loader consumes.

use crate::downsample::clean_with_config;
use crate::errors::IngestionError;
use crate::fetcher::{FetchReport, PaginatedFetcher};
use scholargraph_common::config::CleaningConfig;
use scholargraph_common::metrics;
use scholargraph_common::RecordStore;
use tracing::{info, instrument};

/// What a cleaning run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningSummary {
    pub raw_count: usize,
    pub clean_count: usize,
}

/// Fetch and clean pipeline
pub struct IngestionProcessor {
    fetcher: PaginatedFetcher,
    store: RecordStore,
    cleaning: CleaningConfig,
}

impl IngestionProcessor {
    pub fn new(fetcher: PaginatedFetcher, store: RecordStore, cleaning: CleaningConfig) -> Self {
        Self {
            fetcher,
            store,
            cleaning,
        }
    }

    /// Fetch fresh records and overwrite the raw file
    #[instrument(skip(self))]
    pub async fn fetch_raw(
        &self,
        query: &str,
        pages: u32,
        page_size: u32,
    ) -> Result<FetchReport, IngestionError> {
        info!("Fetching new records");

        let report = self.fetcher.fetch(query, pages, page_size).await?;
        self.store.save_raw(&report.records).await?;

        Ok(report)
    }

    /// Reduce the raw file to the cleaned working set.
    ///
    /// A missing raw file produces an empty cleaned file.
    #[instrument(skip(self))]
    pub async fn clean_raw(&self) -> Result<CleaningSummary, IngestionError> {
        info!(path = %self.store.raw_path().display(), "Loading raw records");

        let raw = self.store.load_raw().await?;
        let raw_count = raw.len();

        let cleaned = clean_with_config(raw, &self.cleaning);
        metrics::record_cleaning(cleaned.len());
        self.store.save_clean(&cleaned).await?;

        Ok(CleaningSummary {
            raw_count,
            clean_count: cleaned.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchPolicy;
    use crate::source::{PageOutcome, PageRequest, PaperSource};
    use async_trait::async_trait;
    use scholargraph_common::errors::Result;
    use scholargraph_common::Record;
    use std::sync::Arc;

    /// Serves the same page for every request
    struct FixedSource(Vec<Record>);

    #[async_trait]
    impl PaperSource for FixedSource {
        async fn fetch_page(&self, _request: &PageRequest) -> Result<PageOutcome> {
            Ok(PageOutcome::Page(self.0.clone()))
        }
    }

    fn paper(id: &str, citations: u64) -> Record {
        Record {
            paper_id: id.to_string(),
            title: Some(id.to_uppercase()),
            abstract_text: Some("abstract".into()),
            year: Some(2022),
            citation_count: Some(citations),
            ..Default::default()
        }
    }

    fn processor(dir: &std::path::Path, records: Vec<Record>, target: usize) -> IngestionProcessor {
        let fetcher = PaginatedFetcher::new(Arc::new(FixedSource(records)), FetchPolicy::default());
        let store = RecordStore::new(dir.join("raw.json"), dir.join("clean/papers.json"));
        IngestionProcessor::new(
            fetcher,
            store,
            CleaningConfig {
                min_citations: 10,
                target,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_then_clean() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), vec![paper("a", 12), paper("b", 3), paper("c", 40)], 500);

        let report = processor.fetch_raw("q", 2, 3).await.unwrap();
        assert_eq!(report.records.len(), 6);

        let summary = processor.clean_raw().await.unwrap();
        assert_eq!(
            summary,
            CleaningSummary {
                raw_count: 6,
                clean_count: 4
            }
        );

        let cleaned = RecordStore::new(dir.path().join("raw.json"), dir.path().join("clean/papers.json"))
            .load_clean()
            .await
            .unwrap();
        let ids: Vec<_> = cleaned.iter().map(|r| r.paper_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "c", "a", "a"]);
    }

    #[tokio::test]
    async fn test_missing_raw_file_yields_empty_clean_set() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), Vec::new(), 500);

        let summary = processor.clean_raw().await.unwrap();

        assert_eq!(summary.raw_count, 0);
        assert_eq!(summary.clean_count, 0);
        assert!(dir.path().join("clean/papers.json").exists());
    }
}
