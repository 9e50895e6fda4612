//! Track command for recording a single page view.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use pf_core::{Event, EventStore, ScreenId, SessionId};

use super::util::parse_datetime;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// The session (user visit) the page view belongs to.
    #[arg(long)]
    pub session: String,

    /// The screen that was shown.
    #[arg(long)]
    pub screen: String,

    /// When the screen was shown: ISO 8601 or relative ("5 minutes ago").
    /// Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Validates the arguments and appends the event to `store`.
pub fn run<S>(store: &mut S, args: &TrackArgs, now: DateTime<Utc>) -> Result<Event>
where
    S: EventStore,
{
    let event = build_event(args, now)?;
    store
        .append(&event)
        .context("failed to store page view")?;
    tracing::info!(
        session_id = %event.session_id,
        screen_id = %event.screen_id,
        "tracked page view"
    );
    Ok(event)
}

fn build_event(args: &TrackArgs, now: DateTime<Utc>) -> Result<Event> {
    let session_id = SessionId::new(args.session.as_str()).context("invalid --session")?;
    let screen_id = ScreenId::new(args.screen.as_str()).context("invalid --screen")?;
    let timestamp = match args.at.as_deref() {
        Some(at) => parse_datetime(at, now).context("invalid --at")?,
        None => now,
    };
    Ok(Event::new(session_id, screen_id, timestamp))
}
