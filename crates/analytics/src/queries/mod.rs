//! Typed query library
//!
//! Each aggregation is identified by a [`QueryId`]. The id fixes the
//! Cypher text, the result columns, the canonical ordering and the default
//! limit; callers only supply the dataset restriction and optional limit.

mod engine;
mod rows;

pub use engine::AggregationEngine;
pub use rows::{
    AggregationRow, AuthorCollaboration, AuthorUsage, DatasetPair, DatasetUsage, SourceUsage,
    VenueUsage, YearUsage,
};

use serde::Serialize;
use serde_json::{Map, Value};

/// Default size of the overall dataset ranking
pub const DEFAULT_TOP_K: usize = 10;
/// Co-occurring pairs reported
pub const COOCCURRENCE_LIMIT: usize = 15;
/// Author rows reported
pub const AUTHOR_LIMIT: usize = 20;
/// Collaboration rows reported
pub const COLLABORATION_LIMIT: usize = 20;

/// The fixed set of aggregation queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryId {
    /// Papers per dataset, top K
    TopDatasets,
    /// Papers per (dataset, source)
    UsageBySource,
    /// Papers per (dataset, year)
    UsageOverTime,
    /// Shared papers per unordered dataset pair
    DatasetCooccurrence,
    /// Papers per (author, dataset)
    TopAuthors,
    /// Papers per (dataset, venue), non-empty venues only
    UsageByVenue,
    /// Papers by either of two distinct authors who both used the dataset
    AuthorCollaboration,
}

impl QueryId {
    pub const ALL: [QueryId; 7] = [
        QueryId::TopDatasets,
        QueryId::UsageBySource,
        QueryId::UsageOverTime,
        QueryId::DatasetCooccurrence,
        QueryId::TopAuthors,
        QueryId::UsageByVenue,
        QueryId::AuthorCollaboration,
    ];

    /// Stable name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            QueryId::TopDatasets => "top_datasets",
            QueryId::UsageBySource => "usage_by_source",
            QueryId::UsageOverTime => "usage_over_time",
            QueryId::DatasetCooccurrence => "dataset_cooccurrence",
            QueryId::TopAuthors => "top_authors",
            QueryId::UsageByVenue => "usage_by_venue",
            QueryId::AuthorCollaboration => "author_collaboration",
        }
    }

    /// Whether the query takes a dataset restriction
    pub fn is_restricted(&self) -> bool {
        !matches!(self, QueryId::TopDatasets | QueryId::DatasetCooccurrence)
    }

    /// Limit applied when the caller does not pick one
    pub fn default_limit(&self) -> Option<usize> {
        match self {
            QueryId::TopDatasets => Some(DEFAULT_TOP_K),
            QueryId::DatasetCooccurrence => Some(COOCCURRENCE_LIMIT),
            QueryId::TopAuthors => Some(AUTHOR_LIMIT),
            QueryId::AuthorCollaboration => Some(COLLABORATION_LIMIT),
            QueryId::UsageBySource | QueryId::UsageOverTime | QueryId::UsageByVenue => None,
        }
    }

    /// Cypher text. Parameters: `$datasets` (restricted queries), `$limit` (limited queries).
    /// All counts are over distinct papers.
    pub fn cypher(&self) -> &'static str {
        match self {
            QueryId::TopDatasets => {
                "MATCH (p:Paper)-[:USES_DATASET]->(d:Dataset) \
                 RETURN d.name AS dataset, COUNT(DISTINCT p) AS usage_count \
                 ORDER BY usage_count DESC, dataset ASC \
                 LIMIT $limit"
            }
            QueryId::UsageBySource => {
                "MATCH (p:Paper)-[:USES_DATASET]->(d:Dataset), (p)-[:PUBLISHED_IN]->(s:Source) \
                 WHERE d.name IN $datasets \
                 RETURN d.name AS dataset, s.name AS source, COUNT(DISTINCT p) AS count \
                 ORDER BY dataset ASC, count DESC, source ASC"
            }
            QueryId::UsageOverTime => {
                "MATCH (p:Paper)-[:USES_DATASET]->(d:Dataset), (p)-[:PUBLISHED_YEAR]->(y:Year) \
                 WHERE d.name IN $datasets \
                 RETURN d.name AS dataset, y.value AS year, COUNT(DISTINCT p) AS count \
                 ORDER BY year ASC, dataset ASC"
            }
            QueryId::DatasetCooccurrence => {
                "MATCH (d1:Dataset)<-[:USES_DATASET]-(p:Paper)-[:USES_DATASET]->(d2:Dataset) \
                 WHERE d1.name < d2.name \
                 RETURN d1.name AS dataset1, d2.name AS dataset2, COUNT(DISTINCT p) AS co_occurrence \
                 ORDER BY co_occurrence DESC, dataset1 ASC, dataset2 ASC \
                 LIMIT $limit"
            }
            QueryId::TopAuthors => {
                "MATCH (a:Author)-[:AUTHORED]->(p:Paper)-[:USES_DATASET]->(d:Dataset) \
                 WHERE d.name IN $datasets \
                 RETURN a.name AS author, d.name AS dataset, COUNT(DISTINCT p) AS paper_count \
                 ORDER BY paper_count DESC, author ASC, dataset ASC \
                 LIMIT $limit"
            }
            QueryId::UsageByVenue => {
                "MATCH (p:Paper)-[:USES_DATASET]->(d:Dataset) \
                 WHERE d.name IN $datasets AND p.venue IS NOT NULL AND trim(p.venue) <> '' \
                 RETURN d.name AS dataset, p.venue AS venue, COUNT(DISTINCT p) AS usage_count \
                 ORDER BY usage_count DESC, dataset ASC, venue ASC"
            }
            QueryId::AuthorCollaboration => {
                "MATCH (a1:Author)-[:AUTHORED]->(p1:Paper)-[:USES_DATASET]->(d:Dataset) \
                       <-[:USES_DATASET]-(p2:Paper)<-[:AUTHORED]-(a2:Author) \
                 WHERE d.name IN $datasets AND a1 <> a2 \
                 WITH d, a1, a2, collect(DISTINCT p1) + collect(DISTINCT p2) AS papers \
                 UNWIND papers AS p \
                 RETURN d.name AS dataset, a1.name AS author1, a2.name AS author2, \
                        COUNT(DISTINCT p) AS shared_papers \
                 ORDER BY shared_papers DESC, dataset ASC, author1 ASC, author2 ASC \
                 LIMIT $limit"
            }
        }
    }
}

/// A query id bound to its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    pub id: QueryId,
    /// Dataset restriction; ignored by unrestricted queries
    pub datasets: Vec<String>,
    pub limit: Option<usize>,
}

impl PreparedQuery {
    pub fn new(id: QueryId) -> Self {
        Self {
            id,
            datasets: Vec::new(),
            limit: id.default_limit(),
        }
    }

    pub fn restricted_to(mut self, datasets: &[String]) -> Self {
        self.datasets = datasets.to_vec();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when a restricted query has nothing to match
    pub fn is_vacuous(&self) -> bool {
        self.id.is_restricted() && self.datasets.is_empty()
    }

    /// Named parameters for the Cypher text
    pub fn parameters(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if self.id.is_restricted() {
            params.insert("datasets".to_string(), Value::from(self.datasets.clone()));
        }
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), Value::from(limit as u64));
        }
        params
    }

    /// Whether `dataset` passes the restriction
    pub fn admits(&self, dataset: &str) -> bool {
        !self.id.is_restricted() || self.datasets.iter().any(|d| d == dataset)
    }
}
