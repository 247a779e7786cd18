//! ScholarGraph Analytics Library
//!
//! Dataset usage analytics over the bibliographic property graph:
//! - Graph store abstraction with Neo4j and in-memory backends
//! - Typed aggregation queries and their engine
//! - Pivot tables and the dataset co-occurrence graph
//! - The report runner used by the `analytics` binary

pub mod cooccurrence;
pub mod graph;
pub mod pivot;
pub mod queries;
pub mod report;

pub use cooccurrence::{CooccurrenceGraph, GraphSnapshot};
pub use graph::{GraphStore, Neo4jStore, PropertyGraph};
pub use pivot::PivotTable;
pub use queries::{AggregationEngine, PreparedQuery, QueryId};
pub use report::{run_report, write_report, AnalyticsReport, ReportSettings};
