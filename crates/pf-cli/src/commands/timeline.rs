//! Timeline command for showing reconstructed sessions.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use pf_core::{EventStore, SessionTimeline, TimelineBuilder, TimelineConfig, format_timestamp};

use super::util::format_dwell;

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Only show this session.
    #[arg(long)]
    pub session: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Builds timelines from the full store snapshot and writes them out.
pub fn run<W, S>(writer: &mut W, store: &S, config: &TimelineConfig, args: &TimelineArgs) -> Result<()>
where
    W: Write,
    S: EventStore,
{
    let events = store.list_all()?;
    let mut timelines = TimelineBuilder::new(*config)
        .build(&events)
        .context("failed to reconstruct timelines")?;

    if let Some(session) = args.session.as_deref() {
        timelines.retain(|timeline| timeline.session_id.as_str() == session);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&timelines)?;
        writeln!(writer, "{json}")?;
    } else {
        write!(writer, "{}", format_timelines(&timelines))?;
    }
    Ok(())
}

/// Formats timelines for terminal output.
pub fn format_timelines(timelines: &[SessionTimeline]) -> String {
    let mut output = String::new();

    if timelines.is_empty() {
        writeln!(output, "No sessions recorded.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'pf track' or 'pf import' to record page views.").unwrap();
        return output;
    }

    for (idx, timeline) in timelines.iter().enumerate() {
        if idx > 0 {
            writeln!(output).unwrap();
        }
        let views = if timeline.len() == 1 { "view" } else { "views" };
        writeln!(
            output,
            "SESSION {} ({} {views}, {})",
            timeline.session_id,
            timeline.len(),
            format_dwell(timeline.total_duration())
        )
        .unwrap();

        let width = timeline
            .screens()
            .map(|screen| screen.as_str().chars().count())
            .max()
            .unwrap_or(0);
        for entry in &timeline.events {
            writeln!(
                output,
                "  {}  {:<width$}  {:>9}",
                format_timestamp(entry.timestamp),
                entry.screen_id.as_str(),
                format_dwell(entry.duration)
            )
            .unwrap();
        }
    }
    output
}
