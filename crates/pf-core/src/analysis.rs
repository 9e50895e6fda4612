//! One-call analysis of an event snapshot.

use serde::{Deserialize, Serialize};

use crate::event::{FlowError, RawEvent};
use crate::store::EventStore;
use crate::timeline::{SessionTimeline, TimelineBuilder, TimelineConfig};
use crate::transition::{TransitionAggregator, TransitionGraph};

/// Both views derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub timelines: Vec<SessionTimeline>,
    pub graph: TransitionGraph,
}

/// Builds timelines, then aggregates their screen sequences.
///
/// Isolated screens are left out of the graph; use the two components
/// directly to include them.
pub fn analyze(events: &[RawEvent], config: &TimelineConfig) -> Result<FlowAnalysis, FlowError> {
    let timelines = TimelineBuilder::new(*config).build(events)?;
    let graph = TransitionAggregator::new().aggregate(&timelines);
    Ok(FlowAnalysis { timelines, graph })
}

/// Errors from analyzing a store's snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError<E: std::error::Error + 'static> {
    /// The store failed to produce a snapshot.
    #[error("failed to read event snapshot")]
    Store(#[source] E),
    /// The snapshot contained an invalid event.
    #[error(transparent)]
    Flow(#[from] FlowError),
}

/// Reads a full snapshot from `store` and analyzes it.
pub fn analyze_store<S: EventStore>(
    store: &S,
    config: &TimelineConfig,
) -> Result<FlowAnalysis, SnapshotError<S::Error>> {
    let events = store.list_all().map_err(SnapshotError::Store)?;
    tracing::debug!(event_count = events.len(), "loaded event snapshot");
    Ok(analyze(&events, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::MemoryStore;

    fn scenario_events() -> Vec<RawEvent> {
        vec![
            RawEvent::new("s1", "home", "2025-01-29T12:00:00Z"),
            RawEvent::new("s1", "list", "2025-01-29T12:00:10Z"),
            RawEvent::new("s1", "detail", "2025-01-29T12:00:25Z"),
            RawEvent::new("s2", "home", "2025-01-29T13:00:00Z"),
            RawEvent::new("s2", "list", "2025-01-29T13:00:03Z"),
            RawEvent::new("s3", "home", "2025-01-29T14:00:00Z"),
        ]
    }

    #[test]
    fn transition_total_matches_timeline_steps() {
        let analysis = analyze(&scenario_events(), &TimelineConfig::default()).unwrap();
        let steps: usize = analysis
            .timelines
            .iter()
            .map(|t| t.len().saturating_sub(1))
            .sum();
        assert_eq!(analysis.graph.total_transitions(), u64::try_from(steps).unwrap());
        assert_eq!(analysis.graph.total_transitions(), 3);
    }

    #[test]
    fn analyze_is_permutation_invariant() {
        let events = scenario_events();
        let mut reversed = events.clone();
        reversed.reverse();

        let config = TimelineConfig::default();
        let a = serde_json::to_string(&analyze(&events, &config).unwrap()).unwrap();
        let b = serde_json::to_string(&analyze(&reversed, &config).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn analyze_empty_snapshot() {
        let analysis = analyze(&[], &TimelineConfig::default()).unwrap();
        assert!(analysis.timelines.is_empty());
        assert!(analysis.graph.is_empty());
    }

    #[test]
    fn analyze_store_reports_invalid_snapshot() {
        let mut store = MemoryStore::new();
        store.push_raw(RawEvent::new("s1", "home", "2025-01-29T12:00:00Z"));
        store.push_raw(RawEvent::new("s1", "home", "garbage"));

        let err = analyze_store(&store, &TimelineConfig::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::Flow(FlowError::MalformedEvent(_))));
    }

    #[test]
    fn analyze_scenario_snapshot() {
        let analysis = analyze(&scenario_events(), &TimelineConfig::default()).unwrap();
        let graph = serde_json::to_string_pretty(&analysis.graph).unwrap();
        insta::assert_snapshot!(graph, @r#"
        {
          "labels": [
            "detail",
            "home",
            "list"
          ],
          "edges": [
            {
              "source_screen": "home",
              "target_screen": "list",
              "count": 2
            },
            {
              "source_screen": "list",
              "target_screen": "detail",
              "count": 1
            }
          ]
        }
        "#);
    }
}
