//! ScholarGraph Ingestion Service
//!
//! Produces the cleaned working set for the graph loader:
//! 1. Optionally fetches fresh records from the search API
//! 2. Persists the raw records
//! 3. Filters, ranks and downsamples them
//! 4. Persists the cleaned records

mod downsample;
mod errors;
mod fetcher;
mod processor;
mod source;

use fetcher::{FetchPolicy, PaginatedFetcher};
use processor::IngestionProcessor;
use scholargraph_common::{config::AppConfig, RecordStore, PAGINATION_CEILING, VERSION};
use source::SemanticScholarSource;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    config.validate()?;

    scholargraph_common::init_tracing(&config.observability);
    scholargraph_common::metrics::register_metrics();

    info!("Starting ScholarGraph Ingestion v{}", VERSION);

    let source = SemanticScholarSource::new(
        config.api.url.clone(),
        config.api.api_key.clone(),
        config.api_timeout(),
    )?;

    let policy = FetchPolicy {
        retry: config.retry_policy(),
        page_pause: config.page_pause(),
        ceiling: PAGINATION_CEILING,
        fields: config.api.fields.clone(),
    };

    info!(
        max_attempts = policy.retry.max_attempts,
        worst_case_wait_secs = policy.retry.worst_case_wait().as_secs(),
        "Rate-limit backoff per page"
    );

    let processor = IngestionProcessor::new(
        PaginatedFetcher::new(Arc::new(source), policy),
        RecordStore::from_config(&config.storage),
        config.cleaning.clone(),
    );

    if config.api.fetch_on_start {
        let report = processor
            .fetch_raw(&config.api.query, config.api.pages, config.api.page_size)
            .await?;

        if report.plan.clamped() {
            warn!(
                requested = report.plan.requested_pages,
                fetched = report.plan.pages,
                "Page count was clamped to the pagination ceiling"
            );
        }

        for failure in &report.failures {
            warn!(
                page = failure.index,
                offset = failure.offset,
                reason = ?failure.reason,
                "Page skipped"
            );
        }
    } else {
        info!(
            path = %config.storage.raw_path.display(),
            "Reusing existing raw records (set APP__API__FETCH_ON_START=true to fetch)"
        );
    }

    let summary = processor.clean_raw().await?;

    info!(
        raw = summary.raw_count,
        cleaned = summary.clean_count,
        "Ingestion complete"
    );

    Ok(())
}
