//! Aggregation of consecutive screen pairs into a weighted transition graph.
//!
//! Counting uses ordered maps only, so edges and labels come out in the same
//! order for any permutation of sessions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::timeline::SessionTimeline;
use crate::types::ScreenId;

/// A directed edge between two screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub source_screen: ScreenId,
    pub target_screen: ScreenId,
    /// Number of times `source_screen` was immediately followed by
    /// `target_screen` within a session, summed over sessions.
    pub count: u64,
}

/// An edge expressed as positions into [`TransitionGraph::labels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexedLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

/// Weighted directed graph over screen labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionGraph {
    /// Distinct screen labels, ascending.
    pub labels: Vec<ScreenId>,
    /// Edges, ascending by `(source_screen, target_screen)`.
    pub edges: Vec<TransitionEdge>,
}

impl TransitionGraph {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.edges.is_empty()
    }

    /// Sum of all edge counts.
    pub fn total_transitions(&self) -> u64 {
        self.edges.iter().map(|edge| edge.count).sum()
    }

    /// Position of `label` within [`Self::labels`].
    pub fn label_index(&self, label: &ScreenId) -> Option<usize> {
        self.labels.binary_search(label).ok()
    }

    /// Edges as node positions, the shape flow diagrams (Sankey) consume.
    pub fn indexed_links(&self) -> Vec<IndexedLink> {
        self.edges
            .iter()
            .filter_map(|edge| {
                Some(IndexedLink {
                    source: self.label_index(&edge.source_screen)?,
                    target: self.label_index(&edge.target_screen)?,
                    value: edge.count,
                })
            })
            .collect()
    }
}

/// Counts screen-to-screen transitions across sessions.
///
/// Only screens that take part in a transition become labels, unless they
/// are added with [`TransitionAggregator::with_labels`].
#[derive(Debug, Clone, Default)]
pub struct TransitionAggregator {
    include: BTreeSet<ScreenId>,
}

impl TransitionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds labels that must appear in the graph even without edges.
    #[must_use]
    pub fn with_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = ScreenId>,
    {
        self.include.extend(labels);
        self
    }

    /// Aggregates the screen sequences of reconstructed timelines.
    pub fn aggregate(&self, timelines: &[SessionTimeline]) -> TransitionGraph {
        self.aggregate_sequences(timelines.iter().map(SessionTimeline::screens))
    }

    /// Aggregates per-session screen sequences, each already in visit order.
    pub fn aggregate_sequences<'a, I, S>(&self, sequences: I) -> TransitionGraph
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = &'a ScreenId>,
    {
        let mut counts: BTreeMap<(&ScreenId, &ScreenId), u64> = BTreeMap::new();
        let mut session_count = 0usize;
        for sequence in sequences {
            session_count += 1;
            let mut previous: Option<&ScreenId> = None;
            for screen in sequence {
                if let Some(source) = previous {
                    *counts.entry((source, screen)).or_insert(0) += 1;
                }
                previous = Some(screen);
            }
        }

        let mut labels: BTreeSet<&ScreenId> = self.include.iter().collect();
        for &(source, target) in counts.keys() {
            labels.insert(source);
            labels.insert(target);
        }

        let graph = TransitionGraph {
            labels: labels.into_iter().cloned().collect(),
            edges: counts
                .into_iter()
                .map(|((source, target), count)| TransitionEdge {
                    source_screen: source.clone(),
                    target_screen: target.clone(),
                    count,
                })
                .collect(),
        };

        tracing::debug!(
            session_count,
            label_count = graph.labels.len(),
            edge_count = graph.edges.len(),
            "aggregated transitions"
        );
        graph
    }
}

/// Screens of sessions with a single event.
///
/// Such sessions produce no transitions; passing this list to
/// [`TransitionAggregator::with_labels`] keeps them as isolated nodes.
pub fn isolated_screens(timelines: &[SessionTimeline]) -> Vec<ScreenId> {
    timelines
        .iter()
        .filter(|timeline| timeline.len() == 1)
        .flat_map(SessionTimeline::screens)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(screens: &[&str]) -> Vec<ScreenId> {
        screens.iter().map(|s| ScreenId::new(*s).unwrap()).collect()
    }

    fn edge_tuples(graph: &TransitionGraph) -> Vec<(&str, &str, u64)> {
        graph
            .edges
            .iter()
            .map(|e| (e.source_screen.as_str(), e.target_screen.as_str(), e.count))
            .collect()
    }

    fn label_strs(graph: &TransitionGraph) -> Vec<&str> {
        graph.labels.iter().map(ScreenId::as_str).collect()
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let sequences: Vec<Vec<ScreenId>> = Vec::new();
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);
        assert!(graph.is_empty());
        assert_eq!(graph.total_transitions(), 0);
    }

    #[test]
    fn linear_session_yields_one_edge_per_step() {
        let sequences = [seq(&["home", "list", "detail"])];
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);

        assert_eq!(
            edge_tuples(&graph),
            [("home", "list", 1), ("list", "detail", 1)]
        );
        assert_eq!(label_strs(&graph), ["detail", "home", "list"]);
    }

    #[test]
    fn identical_pairs_across_sessions_are_summed() {
        let sequences = [seq(&["home", "list"]), seq(&["home", "list"])];
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);
        assert_eq!(edge_tuples(&graph), [("home", "list", 2)]);
    }

    #[test]
    fn self_loops_are_counted() {
        let sequences = [seq(&["list", "list", "list"])];
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);
        assert_eq!(edge_tuples(&graph), [("list", "list", 2)]);
        assert_eq!(label_strs(&graph), ["list"]);
    }

    #[test]
    fn single_screen_sessions_are_not_labels_by_default() {
        let sequences = [seq(&["lonely"]), seq(&["home", "cart"])];
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);
        assert_eq!(label_strs(&graph), ["cart", "home"]);
    }

    #[test]
    fn inclusion_list_adds_isolated_labels() {
        let sequences = [seq(&["lonely"]), seq(&["home", "cart"])];
        let graph = TransitionAggregator::new()
            .with_labels(seq(&["lonely"]))
            .aggregate_sequences(&sequences);
        assert_eq!(label_strs(&graph), ["cart", "home", "lonely"]);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn edges_are_sorted_regardless_of_session_order() {
        let a = [seq(&["z", "a"]), seq(&["b", "c", "a"])];
        let b = [seq(&["b", "c", "a"]), seq(&["z", "a"])];
        let aggregator = TransitionAggregator::new();
        let graph_a = aggregator.aggregate_sequences(&a);
        let graph_b = aggregator.aggregate_sequences(&b);

        assert_eq!(graph_a, graph_b);
        assert_eq!(
            edge_tuples(&graph_a),
            [("b", "c", 1), ("c", "a", 1), ("z", "a", 1)]
        );
    }

    #[test]
    fn indexed_links_point_into_labels() {
        let sequences = [seq(&["home", "search", "detail"]), seq(&["home", "list"])];
        let graph = TransitionAggregator::new().aggregate_sequences(&sequences);

        assert_eq!(label_strs(&graph), ["detail", "home", "list", "search"]);
        let links: Vec<(usize, usize, u64)> = graph
            .indexed_links()
            .iter()
            .map(|l| (l.source, l.target, l.value))
            .collect();
        assert_eq!(links, [(1, 2, 1), (1, 3, 1), (3, 0, 1)]);
    }

    #[test]
    fn edge_serializes_with_wire_field_names() {
        let graph = TransitionAggregator::new().aggregate_sequences(&[seq(&["home", "list"])]);
        let json = serde_json::to_value(&graph.edges[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"source_screen": "home", "target_screen": "list", "count": 1})
        );
    }
}
