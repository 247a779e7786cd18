//! ScholarGraph Analytics Service
//!
//! Runs the aggregation query battery against the loaded property graph:
//! - Top dataset ranking and focus set selection
//! - Usage by source, year and venue
//! - Dataset co-occurrence and its weighted graph
//! - Author usage and collaboration

use scholargraph_analytics::{run_report, write_report, AggregationEngine, Neo4jStore, ReportSettings};
use scholargraph_common::{config::AppConfig, VERSION};
use std::sync::Arc;
use tracing::info;
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

    info!("Starting ScholarGraph Analytics v{}", VERSION);

    let store = Neo4jStore::new(&config.graph, config.graph_timeout())?;
    info!(endpoint = store.endpoint(), "Using graph store");

    let engine = AggregationEngine::new(Arc::new(store));
    let report = run_report(&engine, &ReportSettings::from(&config.analytics)).await?;
    report.log_summary();

    if let Some(ref path) = config.analytics.report_path {
        write_report(&report, path).await?;
    }

    info!("Analytics complete");
    Ok(())
}
