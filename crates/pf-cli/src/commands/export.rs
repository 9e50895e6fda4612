//! Export command for dumping stored page views as JSONL.

use std::io::Write;

use anyhow::Result;
use pf_core::EventStore;

/// Writes every stored event, in append order, one JSON object per line.
pub fn run<W, S>(writer: &mut W, store: &S) -> Result<usize>
where
    W: Write,
    S: EventStore,
{
    let events = store.list_all()?;
    for event in &events {
        let json = serde_json::to_string(event)?;
        writeln!(writer, "{json}")?;
    }
    tracing::debug!(event_count = events.len(), "exported page views");
    Ok(events.len())
}
