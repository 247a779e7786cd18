//! In-memory property graph
//!
//! Holds the same node and edge types as the external store and evaluates
//! every query natively. Edges are kept as lists, so the same relationship
//! may appear more than once; counts are always over distinct papers.

use super::{GraphStore, Row};
use crate::queries::{PreparedQuery, QueryId};
use async_trait::async_trait;
use scholargraph_common::errors::Result;
use scholargraph_common::Record;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Paper node properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperNode {
    pub id: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
}

impl PaperNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    fn has_venue(&self) -> bool {
        self.venue.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

/// In-memory graph of papers and their relations
#[derive(Debug, Clone, Default)]
pub struct PropertyGraph {
    papers: BTreeMap<String, PaperNode>,

    /// (author, paper)
    authored: Vec<(String, String)>,

    /// (paper, dataset)
    uses_dataset: Vec<(String, String)>,

    /// (paper, source)
    published_in: Vec<(String, String)>,

    /// (paper, year)
    published_year: Vec<(String, i64)>,
}

impl PropertyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a paper node
    pub fn add_paper(&mut self, paper: PaperNode) {
        self.papers.insert(paper.id.clone(), paper);
    }

    /// Edges create a bare paper node when the paper is unknown
    fn ensure_paper(&mut self, paper: &str) {
        if !self.papers.contains_key(paper) {
            self.papers.insert(paper.to_string(), PaperNode::new(paper));
        }
    }

    pub fn add_authored(&mut self, author: &str, paper: &str) {
        self.ensure_paper(paper);
        self.authored.push((author.to_string(), paper.to_string()));
    }

    pub fn add_dataset_use(&mut self, paper: &str, dataset: &str) {
        self.ensure_paper(paper);
        self.uses_dataset.push((paper.to_string(), dataset.to_string()));
    }

    pub fn add_published_in(&mut self, paper: &str, source: &str) {
        self.ensure_paper(paper);
        self.published_in.push((paper.to_string(), source.to_string()));
    }

    pub fn add_published_year(&mut self, paper: &str, year: i64) {
        self.ensure_paper(paper);
        self.published_year.push((paper.to_string(), year));
    }

    /// Load a cleaned record with all of its relations
    pub fn load_record(&mut self, record: &Record, source: &str, datasets: &[&str]) {
        self.add_paper(PaperNode {
            id: record.paper_id.clone(),
            title: record.title.clone(),
            year: record.year,
            venue: record.venue.clone(),
        });

        for author in record.author_names() {
            self.add_authored(author, &record.paper_id);
        }
        for dataset in datasets {
            self.add_dataset_use(&record.paper_id, dataset);
        }
        self.add_published_in(&record.paper_id, source);
        if let Some(year) = record.year {
            self.add_published_year(&record.paper_id, i64::from(year));
        }
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    pub fn paper(&self, id: &str) -> Option<&PaperNode> {
        self.papers.get(id)
    }

    /// Distinct datasets per paper
    fn datasets_by_paper(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (paper, dataset) in &self.uses_dataset {
            index.entry(paper.as_str()).or_default().insert(dataset.as_str());
        }
        index
    }

    fn evaluate(&self, query: &PreparedQuery) -> Vec<Row> {
        match query.id {
            QueryId::TopDatasets => {
                let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
                for (paper, dataset) in &self.uses_dataset {
                    groups.entry(dataset.as_str()).or_default().insert(paper.as_str());
                }
                groups
                    .into_iter()
                    .map(|(dataset, papers)| row(json!({"dataset": dataset, "usage_count": papers.len()})))
                    .collect()
            }
            QueryId::UsageBySource => {
                let mut sources: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
                for (paper, source) in &self.published_in {
                    sources.entry(paper.as_str()).or_default().insert(source.as_str());
                }

                let mut groups: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
                for (paper, dataset) in self.restricted_uses(query) {
                    for source in sources.get(paper).into_iter().flatten() {
                        groups.entry((dataset, *source)).or_default().insert(paper);
                    }
                }
                groups
                    .into_iter()
                    .map(|((dataset, source), papers)| {
                        row(json!({"dataset": dataset, "source": source, "count": papers.len()}))
                    })
                    .collect()
            }
            QueryId::UsageOverTime => {
                let mut years: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
                for (paper, year) in &self.published_year {
                    years.entry(paper.as_str()).or_default().insert(*year);
                }

                let mut groups: BTreeMap<(&str, i64), BTreeSet<&str>> = BTreeMap::new();
                for (paper, dataset) in self.restricted_uses(query) {
                    for year in years.get(paper).into_iter().flatten() {
                        groups.entry((dataset, *year)).or_default().insert(paper);
                    }
                }
                groups
                    .into_iter()
                    .map(|((dataset, year), papers)| {
                        row(json!({"dataset": dataset, "year": year, "count": papers.len()}))
                    })
                    .collect()
            }
            QueryId::DatasetCooccurrence => {
                let mut groups: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
                for (paper, datasets) in self.datasets_by_paper() {
                    // BTreeSet iteration is sorted, so d1 < d2 holds
                    let datasets: Vec<&str> = datasets.into_iter().collect();
                    for (i, d1) in datasets.iter().enumerate() {
                        for d2 in &datasets[i + 1..] {
                            groups.entry((*d1, *d2)).or_default().insert(paper);
                        }
                    }
                }
                groups
                    .into_iter()
                    .map(|((d1, d2), papers)| {
                        row(json!({"dataset1": d1, "dataset2": d2, "co_occurrence": papers.len()}))
                    })
                    .collect()
            }
            QueryId::TopAuthors => {
                let datasets = self.datasets_by_paper();
                let mut groups: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
                for (author, paper) in &self.authored {
                    for dataset in datasets.get(paper.as_str()).into_iter().flatten() {
                        if query.admits(dataset) {
                            groups
                                .entry((author.as_str(), *dataset))
                                .or_default()
                                .insert(paper.as_str());
                        }
                    }
                }
                groups
                    .into_iter()
                    .map(|((author, dataset), papers)| {
                        row(json!({"author": author, "dataset": dataset, "paper_count": papers.len()}))
                    })
                    .collect()
            }
            QueryId::UsageByVenue => {
                let mut groups: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
                for (paper, dataset) in self.restricted_uses(query) {
                    let Some(node) = self.papers.get(paper).filter(|p| p.has_venue()) else {
                        continue;
                    };
                    if let Some(venue) = node.venue.as_deref() {
                        groups.entry((dataset, venue)).or_default().insert(paper);
                    }
                }
                groups
                    .into_iter()
                    .map(|((dataset, venue), papers)| {
                        row(json!({"dataset": dataset, "venue": venue, "usage_count": papers.len()}))
                    })
                    .collect()
            }
            QueryId::AuthorCollaboration => {
                let datasets = self.datasets_by_paper();

                // dataset -> author -> papers by that author using it
                let mut usage: BTreeMap<&str, BTreeMap<&str, BTreeSet<&str>>> = BTreeMap::new();
                for (author, paper) in &self.authored {
                    for dataset in datasets.get(paper.as_str()).into_iter().flatten() {
                        if query.admits(dataset) {
                            usage
                                .entry(*dataset)
                                .or_default()
                                .entry(author.as_str())
                                .or_default()
                                .insert(paper.as_str());
                        }
                    }
                }

                let mut groups: BTreeMap<(&str, &str, &str), BTreeSet<&str>> = BTreeMap::new();
                for (dataset, by_author) in &usage {
                    for (a1, papers1) in by_author {
                        for (a2, papers2) in by_author.iter().filter(|(a2, _)| *a2 != a1) {
                            let papers: BTreeSet<&str> = papers1.union(papers2).copied().collect();
                            groups.insert((*dataset, *a1, *a2), papers);
                        }
                    }
                }
                groups
                    .into_iter()
                    .map(|((dataset, a1, a2), papers)| {
                        row(json!({
                            "dataset": dataset,
                            "author1": a1,
                            "author2": a2,
                            "shared_papers": papers.len(),
                        }))
                    })
                    .collect()
            }
        }
    }

    /// USES_DATASET edges that pass the query's restriction
    fn restricted_uses<'a>(&'a self, query: &'a PreparedQuery) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.uses_dataset
            .iter()
            .filter(move |(_, dataset)| query.admits(dataset))
            .map(|(paper, dataset)| (paper.as_str(), dataset.as_str()))
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

#[async_trait]
impl GraphStore for PropertyGraph {
    async fn execute(&self, query: &PreparedQuery) -> Result<Vec<Row>> {
        Ok(self.evaluate(query))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_for(rows: &[Row], key: &str, value: &str, measure: &str) -> u64 {
        rows.iter()
            .find(|r| r[key] == value)
            .and_then(|r| r[measure].as_u64())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_duplicate_edges_count_once() {
        let mut graph = PropertyGraph::new();
        graph.add_dataset_use("p1", "MNIST");
        graph.add_dataset_use("p1", "MNIST");
        graph.add_dataset_use("p2", "MNIST");

        let rows = graph.execute(&PreparedQuery::new(QueryId::TopDatasets)).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(count_for(&rows, "dataset", "MNIST", "usage_count"), 2);
    }

    #[tokio::test]
    async fn test_edges_create_paper_nodes() {
        let mut graph = PropertyGraph::new();
        graph.add_authored("Ada", "p1");
        graph.add_published_year("p2", 2020);

        assert_eq!(graph.paper_count(), 2);
        assert_eq!(graph.paper("p1"), Some(&PaperNode::new("p1")));
    }

    #[tokio::test]
    async fn test_collaboration_spans_separate_papers() {
        let mut graph = PropertyGraph::new();
        graph.add_authored("Ada", "p1");
        graph.add_authored("Grace", "p2");
        graph.add_authored("Linus", "p3");
        graph.add_dataset_use("p1", "MNIST");
        graph.add_dataset_use("p2", "MNIST");
        graph.add_dataset_use("p3", "COCO");

        // Linus shares no dataset with anyone
        let focus = vec!["MNIST".to_string(), "COCO".to_string()];
        let query = PreparedQuery::new(QueryId::AuthorCollaboration).restricted_to(&focus);
        let rows = graph.execute(&query).await.unwrap();

        let pairs: Vec<_> = rows
            .iter()
            .map(|r| (r["author1"].clone(), r["author2"].clone(), r["shared_papers"].clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (json!("Ada"), json!("Grace"), json!(2)),
                (json!("Grace"), json!("Ada"), json!(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_collaboration_counts_distinct_papers() {
        let mut graph = PropertyGraph::new();
        // co-authored paper plus one solo paper each, all on MNIST
        for (author, paper) in [("Ada", "p1"), ("Grace", "p1"), ("Ada", "p2"), ("Grace", "p3"), ("Ada", "p2")] {
            graph.add_authored(author, paper);
        }
        for paper in ["p1", "p2", "p3"] {
            graph.add_dataset_use(paper, "MNIST");
        }

        let query = PreparedQuery::new(QueryId::AuthorCollaboration).restricted_to(&["MNIST".to_string()]);
        let rows = graph.execute(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["shared_papers"] == 3));
        assert!(rows.iter().all(|r| r["author1"] != r["author2"]));
    }

    #[tokio::test]
    async fn test_load_record() {
        let record = Record {
            paper_id: "p1".into(),
            title: Some("T".into()),
            abstract_text: Some("A".into()),
            year: Some(2021),
            venue: Some("ICML".into()),
            authors: vec![
                scholargraph_common::AuthorRef::named("Ada"),
                scholargraph_common::AuthorRef::named("Grace"),
            ],
            ..Default::default()
        };
        let mut graph = PropertyGraph::new();
        graph.load_record(&record, "Semantic Scholar", &["MNIST", "CIFAR-10"]);

        let query = PreparedQuery::new(QueryId::UsageByVenue).restricted_to(&["MNIST".to_string()]);
        let rows = graph.execute(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["venue"], "ICML");

        let pairs = graph
            .execute(&PreparedQuery::new(QueryId::DatasetCooccurrence))
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0]["dataset1"], "CIFAR-10");
        assert_eq!(pairs[0]["dataset2"], "MNIST");
    }
}
