//! Analytics report
//!
//! Runs the full query battery in dependency order: the overall top-K
//! ranking picks the focus datasets, which restrict every downstream query.

use crate::cooccurrence::{CooccurrenceGraph, GraphSnapshot};
use crate::pivot::PivotTable;
use crate::queries::{
    AggregationEngine, AuthorCollaboration, AuthorUsage, DatasetPair, DatasetUsage, SourceUsage,
    VenueUsage, YearUsage, DEFAULT_TOP_K,
};
use scholargraph_common::config::AnalyticsConfig;
use scholargraph_common::errors::{AppError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

/// Size of the control ranking and of the focus set drawn from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub top_k: usize,
    pub focus_datasets: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            focus_datasets: 5,
        }
    }
}

impl From<&AnalyticsConfig> for ReportSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            top_k: config.top_k,
            focus_datasets: config.focus_datasets,
        }
    }
}

/// Every query result plus the derived pivots and graph
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub top_datasets: Vec<DatasetUsage>,
    pub focus_datasets: Vec<String>,
    pub usage_by_source: Vec<SourceUsage>,
    pub usage_over_time: Vec<YearUsage>,
    pub cooccurrence: Vec<DatasetPair>,
    pub top_authors: Vec<AuthorUsage>,
    pub usage_by_venue: Vec<VenueUsage>,
    pub author_collaboration: Vec<AuthorCollaboration>,

    /// dataset × source
    pub source_pivot: PivotTable<String, String>,
    /// year × dataset
    pub trend_pivot: PivotTable<i64, String>,
    /// venue × dataset
    pub venue_pivot: PivotTable<String, String>,

    /// Present only when the co-occurrence rows pass the minimum-data gate
    pub cooccurrence_graph: Option<GraphSnapshot>,
}

/// Run every query and derive the pivots and co-occurrence graph
#[instrument(skip(engine))]
pub async fn run_report(engine: &AggregationEngine, settings: &ReportSettings) -> Result<AnalyticsReport> {
    let top_datasets = engine.top_datasets(settings.top_k).await?;
    let focus_datasets: Vec<String> = top_datasets
        .iter()
        .take(settings.focus_datasets)
        .map(|r| r.dataset.clone())
        .collect();

    info!(focus = ?focus_datasets, "Selected focus datasets");

    let usage_by_source = engine.usage_by_source(&focus_datasets).await?;
    let usage_over_time = engine.usage_over_time(&focus_datasets).await?;
    let cooccurrence = engine.cooccurrence().await?;
    let top_authors = engine.top_authors(&focus_datasets).await?;
    let usage_by_venue = engine.usage_by_venue(&focus_datasets).await?;
    let author_collaboration = engine.author_collaboration(&focus_datasets).await?;

    let source_pivot = PivotTable::from_rows(
        &usage_by_source,
        |r| r.dataset.clone(),
        |r| r.source.clone(),
        |r| r.count,
    );
    let trend_pivot = PivotTable::from_rows(
        &usage_over_time,
        |r| r.year,
        |r| r.dataset.clone(),
        |r| r.count,
    );
    let venue_pivot = PivotTable::from_rows(
        &usage_by_venue,
        |r| r.venue.clone(),
        |r| r.dataset.clone(),
        |r| r.usage_count,
    );

    let cooccurrence_graph = CooccurrenceGraph::build(&cooccurrence).map(|g| g.snapshot());
    if cooccurrence_graph.is_none() {
        info!(
            rows = cooccurrence.len(),
            "Too few co-occurrence rows, skipping graph"
        );
    }

    Ok(AnalyticsReport {
        top_datasets,
        focus_datasets,
        usage_by_source,
        usage_over_time,
        cooccurrence,
        top_authors,
        usage_by_venue,
        author_collaboration,
        source_pivot,
        trend_pivot,
        venue_pivot,
        cooccurrence_graph,
    })
}

impl AnalyticsReport {
    /// Emit one log event per section
    pub fn log_summary(&self) {
        for row in &self.top_datasets {
            info!(dataset = %row.dataset, papers = row.usage_count, "Top dataset");
        }
        info!(
            sources = self.usage_by_source.len(),
            trend_points = self.usage_over_time.len(),
            pairs = self.cooccurrence.len(),
            authors = self.top_authors.len(),
            venues = self.usage_by_venue.len(),
            collaborations = self.author_collaboration.len(),
            "Query results"
        );
        if let Some(graph) = &self.cooccurrence_graph {
            info!(
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                "Co-occurrence graph"
            );
        }
    }
}

/// Write the report as pretty JSON, creating parent directories
pub async fn write_report(report: &AnalyticsReport, path: &Path) -> Result<()> {
    let storage_err = |e: std::io::Error| AppError::Storage {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
    }

    let bytes = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, bytes).await.map_err(storage_err)?;

    info!(path = %path.display(), "Report written");
    Ok(())
}
