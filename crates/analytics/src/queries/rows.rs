//! Result row shapes
//!
//! Field names match the Cypher column aliases so rows decode straight from
//! the store. Every row type carries its canonical ordering; the engine
//! re-sorts with it so results do not depend on store-side ordering.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A decoded aggregation row with a total, deterministic order
pub trait AggregationRow: DeserializeOwned + Serialize + Clone {
    fn canonical_cmp(&self, other: &Self) -> Ordering;
}

/// Papers using a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetUsage {
    pub dataset: String,
    pub usage_count: u64,
}

impl AggregationRow for DatasetUsage {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .usage_count
            .cmp(&self.usage_count)
            .then_with(|| self.dataset.cmp(&other.dataset))
    }
}

/// Papers using a dataset, per source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUsage {
    pub dataset: String,
    pub source: String,
    pub count: u64,
}

impl AggregationRow for SourceUsage {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.dataset
            .cmp(&other.dataset)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.source.cmp(&other.source))
    }
}

/// Papers using a dataset, per publication year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearUsage {
    pub dataset: String,
    pub year: i64,
    pub count: u64,
}

impl AggregationRow for YearUsage {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.dataset.cmp(&other.dataset))
    }
}

/// Papers using both datasets; `dataset1 < dataset2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPair {
    pub dataset1: String,
    pub dataset2: String,
    pub co_occurrence: u64,
}

impl DatasetPair {
    /// Build a pair in canonical (lexicographic) order
    pub fn new(a: impl Into<String>, b: impl Into<String>, co_occurrence: u64) -> Self {
        let (a, b) = (a.into(), b.into());
        let (dataset1, dataset2) = if a <= b { (a, b) } else { (b, a) };
        Self {
            dataset1,
            dataset2,
            co_occurrence,
        }
    }
}

impl AggregationRow for DatasetPair {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .co_occurrence
            .cmp(&self.co_occurrence)
            .then_with(|| self.dataset1.cmp(&other.dataset1))
            .then_with(|| self.dataset2.cmp(&other.dataset2))
    }
}

/// Papers by an author using a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorUsage {
    pub author: String,
    pub dataset: String,
    pub paper_count: u64,
}

impl AggregationRow for AuthorUsage {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .paper_count
            .cmp(&self.paper_count)
            .then_with(|| self.author.cmp(&other.author))
            .then_with(|| self.dataset.cmp(&other.dataset))
    }
}

/// Papers using a dataset, per venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueUsage {
    pub dataset: String,
    pub venue: String,
    pub usage_count: u64,
}

impl AggregationRow for VenueUsage {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .usage_count
            .cmp(&self.usage_count)
            .then_with(|| self.dataset.cmp(&other.dataset))
            .then_with(|| self.venue.cmp(&other.venue))
    }
}

/// Two distinct authors who each wrote a paper using the same dataset.
///
/// `shared_papers` counts the distinct papers using the dataset written by
/// either author. Directional: both (a, b) and (b, a) are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCollaboration {
    pub dataset: String,
    pub author1: String,
    pub author2: String,
    pub shared_papers: u64,
}

impl AggregationRow for AuthorCollaboration {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .shared_papers
            .cmp(&self.shared_papers)
            .then_with(|| self.dataset.cmp(&other.dataset))
            .then_with(|| self.author1.cmp(&other.author1))
            .then_with(|| self.author2.cmp(&other.author2))
    }
}
