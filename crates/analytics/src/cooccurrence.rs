//! Dataset co-occurrence graph
//!
//! Undirected weighted graph derived from pairwise co-occurrence rows.
//! Nodes are dataset names, edge weight is the shared-paper count and node
//! degree is the number of distinct partners (not the weighted sum).

use crate::queries::DatasetPair;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Rows required before a graph is worth building; exactly this many is not enough
pub const MIN_COOCCURRENCE_ROWS: usize = 3;

/// Undirected co-occurrence graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooccurrenceGraph {
    nodes: BTreeSet<String>,

    /// Keyed by (smaller, larger) name
    edges: BTreeMap<(String, String), u64>,

    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl CooccurrenceGraph {
    /// Build from query rows, or `None` when the minimum-data gate is not met
    pub fn build(pairs: &[DatasetPair]) -> Option<Self> {
        if pairs.len() <= MIN_COOCCURRENCE_ROWS {
            return None;
        }
        Some(Self::from_pairs(pairs))
    }

    /// Build without the minimum-data gate
    pub fn from_pairs(pairs: &[DatasetPair]) -> Self {
        let mut graph = Self::default();
        for pair in pairs {
            graph.add_edge(&pair.dataset1, &pair.dataset2, pair.co_occurrence);
        }
        graph
    }

    /// Add or overwrite an edge. Self-pairs are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: u64) {
        if a == b {
            return;
        }

        self.nodes.insert(a.to_string());
        self.nodes.insert(b.to_string());
        self.edges.insert(edge_key(a, b), weight);

        self.adjacency.entry(a.to_string()).or_default().insert(b.to_string());
        self.adjacency.entry(b.to_string()).or_default().insert(a.to_string());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Edge weight, independent of argument order
    pub fn weight(&self, a: &str, b: &str) -> Option<u64> {
        self.edges.get(&edge_key(a, b)).copied()
    }

    /// Number of distinct partners
    pub fn degree(&self, node: &str) -> usize {
        self.adjacency.get(node).map(|n| n.len()).unwrap_or(0)
    }

    pub fn degrees(&self) -> BTreeMap<String, usize> {
        self.nodes
            .iter()
            .map(|n| (n.clone(), self.degree(n)))
            .collect()
    }

    pub fn neighbors(&self, node: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Serializable view for the presentation layer
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.iter().cloned().collect(),
            edges: self
                .edges
                .iter()
                .map(|((source, target), weight)| WeightedEdge {
                    source: source.clone(),
                    target: target.clone(),
                    weight: *weight,
                })
                .collect(),
            degree: self.degrees(),
        }
    }
}

fn edge_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Edge as exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

/// Exported graph: sorted nodes, edges and degrees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<String>,
    pub edges: Vec<WeightedEdge>,
    pub degree: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pairs() -> Vec<DatasetPair> {
        vec![
            DatasetPair::new("D1", "D2", 10),
            DatasetPair::new("D1", "D3", 4),
            DatasetPair::new("D2", "D3", 1),
            DatasetPair::new("D1", "D4", 7),
        ]
    }

    #[test]
    fn test_build_example_graph() {
        let graph = CooccurrenceGraph::build(&sample_pairs()).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.degree("D1"), 3);
        assert_eq!(graph.degree("D3"), 2);
        assert_eq!(graph.degree("D4"), 1);
        assert_eq!(graph.weight("D1", "D2"), Some(10));
    }

    #[test]
    fn test_minimum_data_gate() {
        let pairs = sample_pairs();
        assert!(CooccurrenceGraph::build(&pairs[..3]).is_none());
        assert!(CooccurrenceGraph::build(&pairs).is_some());
        assert!(CooccurrenceGraph::build(&[]).is_none());
    }

    #[test]
    fn test_weight_is_symmetric() {
        let graph = CooccurrenceGraph::from_pairs(&sample_pairs());
        assert_eq!(graph.weight("D3", "D1"), graph.weight("D1", "D3"));
        assert_eq!(graph.weight("D2", "D4"), None);

        let mut partners: Vec<_> = graph.neighbors("D3").collect();
        partners.sort();
        assert_eq!(partners, vec!["D1", "D2"]);
    }

    #[test]
    fn test_degree_counts_partners_not_weight() {
        let mut graph = CooccurrenceGraph::default();
        graph.add_edge("A", "B", 100);
        graph.add_edge("B", "A", 3);
        graph.add_edge("A", "A", 9);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree("A"), 1);
        assert_eq!(graph.weight("A", "B"), Some(3));
        assert_eq!(graph.degree("missing"), 0);
    }

    #[test]
    fn test_snapshot() {
        let snapshot = CooccurrenceGraph::from_pairs(&sample_pairs()).snapshot();
        assert_eq!(snapshot.nodes, vec!["D1", "D2", "D3", "D4"]);
        assert_eq!(snapshot.edges[0].source, "D1");
        assert_eq!(snapshot.edges[0].target, "D2");
        assert_eq!(snapshot.degree["D1"], 3);
    }
}
