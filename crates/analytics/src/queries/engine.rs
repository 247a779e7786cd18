//! Aggregation engine
//!
//! Runs prepared queries against a [`GraphStore`] and decodes the rows into
//! typed records. Store failures surface to the caller unchanged; there is
//! no retry at this layer.

use super::{
    AggregationRow, AuthorCollaboration, AuthorUsage, DatasetPair, DatasetUsage, PreparedQuery,
    QueryId, SourceUsage, VenueUsage, YearUsage,
};
use crate::graph::GraphStore;
use scholargraph_common::errors::{AppError, Result};
use scholargraph_common::metrics;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Executes the query library against a graph store
#[derive(Clone)]
pub struct AggregationEngine {
    store: Arc<dyn GraphStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Execute, decode, order and limit a prepared query
    #[instrument(skip(self, query), fields(query = query.id.name(), store = self.store.name()))]
    pub async fn run<R: AggregationRow>(&self, query: PreparedQuery) -> Result<Vec<R>> {
        if query.is_vacuous() {
            debug!("Empty dataset restriction, skipping store");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let raw = self.store.execute(&query).await?;

        let mut rows = raw
            .into_iter()
            .map(|row| {
                serde_json::from_value::<R>(Value::Object(row)).map_err(|e| AppError::RowDecode {
                    query: query.id.name().to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<R>>>()?;

        rows.sort_by(AggregationRow::canonical_cmp);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        metrics::record_graph_query(query.id.name(), start.elapsed().as_secs_f64(), rows.len());
        debug!(rows = rows.len(), "Query complete");

        Ok(rows)
    }

    /// Datasets ranked by distinct paper count
    pub async fn top_datasets(&self, k: usize) -> Result<Vec<DatasetUsage>> {
        self.run(PreparedQuery::new(QueryId::TopDatasets).with_limit(k))
            .await
    }

    pub async fn usage_by_source(&self, datasets: &[String]) -> Result<Vec<SourceUsage>> {
        self.run(PreparedQuery::new(QueryId::UsageBySource).restricted_to(datasets))
            .await
    }

    pub async fn usage_over_time(&self, datasets: &[String]) -> Result<Vec<YearUsage>> {
        self.run(PreparedQuery::new(QueryId::UsageOverTime).restricted_to(datasets))
            .await
    }

    /// Top co-occurring dataset pairs, unrestricted
    pub async fn cooccurrence(&self) -> Result<Vec<DatasetPair>> {
        self.run(PreparedQuery::new(QueryId::DatasetCooccurrence))
            .await
    }

    pub async fn top_authors(&self, datasets: &[String]) -> Result<Vec<AuthorUsage>> {
        self.run(PreparedQuery::new(QueryId::TopAuthors).restricted_to(datasets))
            .await
    }

    pub async fn usage_by_venue(&self, datasets: &[String]) -> Result<Vec<VenueUsage>> {
        self.run(PreparedQuery::new(QueryId::UsageByVenue).restricted_to(datasets))
            .await
    }

    pub async fn author_collaboration(
        &self,
        datasets: &[String],
    ) -> Result<Vec<AuthorCollaboration>> {
        self.run(PreparedQuery::new(QueryId::AuthorCollaboration).restricted_to(datasets))
            .await
    }
}
