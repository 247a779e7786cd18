//! Property graph access
//!
//! The graph is owned by an external store; the analytics service only
//! executes read queries against it. Schema contract with the loader:
//! - Nodes: Paper, Author, Dataset, Source, Year
//! - Edges: (Author)-[:AUTHORED]->(Paper), (Paper)-[:USES_DATASET]->(Dataset),
//!   (Paper)-[:PUBLISHED_IN]->(Source), (Paper)-[:PUBLISHED_YEAR]->(Year)

mod memory;
mod neo4j;

pub use memory::{PaperNode, PropertyGraph};
pub use neo4j::Neo4jStore;

use crate::queries::PreparedQuery;
use async_trait::async_trait;
use scholargraph_common::errors::Result;
use serde_json::{Map, Value};

/// A flat result row: column name to scalar
pub type Row = Map<String, Value>;

/// Trait for graph stores that can execute the query library
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Execute a read-only query. Failures are final; callers do not retry.
    async fn execute(&self, query: &PreparedQuery) -> Result<Vec<Row>>;

    /// Store name for logs
    fn name(&self) -> &str;
}
