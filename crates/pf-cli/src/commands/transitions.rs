//! Transitions command for showing the aggregated screen flow graph.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use pf_core::{
    EventStore, ScreenId, TimelineBuilder, TimelineConfig, TransitionAggregator, TransitionGraph,
    isolated_screens,
};

#[derive(Debug, Args)]
pub struct TransitionsArgs {
    /// Keep screens of single-view sessions as isolated nodes.
    #[arg(long)]
    pub include_isolated: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Aggregates transitions over the full store snapshot and writes them out.
pub fn run<W, S>(
    writer: &mut W,
    store: &S,
    config: &TimelineConfig,
    args: &TransitionsArgs,
) -> Result<()>
where
    W: Write,
    S: EventStore,
{
    let events = store.list_all()?;
    let timelines = TimelineBuilder::new(*config)
        .build(&events)
        .context("failed to reconstruct timelines")?;

    let mut aggregator = TransitionAggregator::new();
    if args.include_isolated {
        aggregator = aggregator.with_labels(isolated_screens(&timelines));
    }
    let graph = aggregator.aggregate(&timelines);

    if args.json {
        let json = serde_json::to_string_pretty(&graph)?;
        writeln!(writer, "{json}")?;
    } else {
        write!(writer, "{}", format_graph(&graph))?;
    }
    Ok(())
}

/// Formats a transition graph for terminal output.
pub fn format_graph(graph: &TransitionGraph) -> String {
    let mut output = String::new();

    if graph.is_empty() {
        writeln!(output, "No transitions recorded.").unwrap();
        return output;
    }

    let screens = if graph.labels.len() == 1 { "screen" } else { "screens" };
    writeln!(
        output,
        "TRANSITIONS: {} {screens}, {} edges, {} moves",
        graph.labels.len(),
        graph.edges.len(),
        graph.total_transitions()
    )
    .unwrap();

    let width = graph
        .edges
        .iter()
        .map(|edge| edge.source_screen.as_str().chars().count())
        .max()
        .unwrap_or(0);
    for edge in &graph.edges {
        writeln!(
            output,
            "  {:<width$} -> {}  ({})",
            edge.source_screen.as_str(),
            edge.target_screen,
            edge.count
        )
        .unwrap();
    }

    let connected: BTreeSet<&ScreenId> = graph
        .edges
        .iter()
        .flat_map(|edge| [&edge.source_screen, &edge.target_screen])
        .collect();
    let isolated: Vec<&str> = graph
        .labels
        .iter()
        .filter(|label| !connected.contains(label))
        .map(ScreenId::as_str)
        .collect();
    if !isolated.is_empty() {
        writeln!(output, "  isolated: {}", isolated.join(", ")).unwrap();
    }
    output
}
