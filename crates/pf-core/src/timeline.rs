//! Per-session timeline reconstruction.
//!
//! # Algorithm Summary
//!
//! 1. Validate every event in the batch; any failure aborts the whole batch
//! 2. Group events by session in an ordered map (sessions come out sorted)
//! 3. Stable-sort each session by timestamp, so ties keep input order
//! 4. Scan each session forward: an entry dwells until the next entry's
//!    timestamp, and the last entry gets the configured default dwell

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::event::{Event, FlowError, RawEvent};
use crate::types::{ScreenId, SessionId, ValidationError};

/// Dwell assigned to the last screen of a session, in seconds.
pub const DEFAULT_DWELL_SECS: f64 = 30.0;

/// Configuration for timeline reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Duration given to the last entry of every session, where no later
    /// event bounds the visit.
    /// Default: 30.0.
    pub default_dwell_secs: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_dwell_secs: DEFAULT_DWELL_SECS,
        }
    }
}

impl TimelineConfig {
    /// Creates a configuration after checking the dwell is finite and non-negative.
    pub fn new(default_dwell_secs: f64) -> Result<Self, ValidationError> {
        if !default_dwell_secs.is_finite() || default_dwell_secs < 0.0 {
            return Err(ValidationError::InvalidDwell {
                value: default_dwell_secs,
            });
        }
        Ok(Self { default_dwell_secs })
    }
}

/// One visit within a reconstructed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub screen_id: ScreenId,
    pub timestamp: DateTime<Utc>,
    /// Seconds the user is inferred to have stayed on `screen_id`.
    pub duration: f64,
}

/// The ordered visits of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTimeline {
    pub session_id: SessionId,
    /// Entries in ascending timestamp order.
    pub events: Vec<TimelineEntry>,
}

impl SessionTimeline {
    /// The session's screens in visit order.
    pub fn screens(&self) -> impl Iterator<Item = &ScreenId> + '_ {
        self.events.iter().map(|entry| &entry.screen_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of all entry durations, including the trailing default dwell.
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(|entry| entry.duration).sum()
    }
}

/// Builds one [`SessionTimeline`] per distinct session in an event snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineBuilder {
    config: TimelineConfig,
}

impl TimelineBuilder {
    pub const fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Validates a raw snapshot and reconstructs its timelines.
    ///
    /// Fails on the first invalid record; no timelines are returned in that case.
    pub fn build(&self, events: &[RawEvent]) -> Result<Vec<SessionTimeline>, FlowError> {
        let events = events
            .iter()
            .enumerate()
            .map(|(position, raw)| raw.validate(position))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.build_from_events(events))
    }

    /// Reconstructs timelines from already-validated events.
    ///
    /// Events with equal timestamps in the same session keep the order in
    /// which they appear in `events`.
    pub fn build_from_events<I>(&self, events: I) -> Vec<SessionTimeline>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut sessions: BTreeMap<SessionId, Vec<(DateTime<Utc>, ScreenId)>> = BTreeMap::new();
        let mut event_count = 0usize;
        for event in events {
            event_count += 1;
            sessions
                .entry(event.session_id)
                .or_default()
                .push((event.timestamp, event.screen_id));
        }

        let default_dwell = self.config.default_dwell_secs;
        let sessions: Vec<_> = sessions.into_iter().collect();
        let timelines: Vec<SessionTimeline> = sessions
            .into_par_iter()
            .map(|(session_id, mut visits)| {
                // sort_by_key is stable
                visits.sort_by_key(|(timestamp, _)| *timestamp);
                SessionTimeline {
                    session_id,
                    events: infer_durations(visits, default_dwell),
                }
            })
            .collect();

        tracing::debug!(
            event_count,
            session_count = timelines.len(),
            "reconstructed session timelines"
        );
        timelines
    }
}

/// Forward scan over one session's sorted visits.
fn infer_durations(
    visits: Vec<(DateTime<Utc>, ScreenId)>,
    default_dwell: f64,
) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(visits.len());
    let mut visits = visits.into_iter().peekable();
    while let Some((timestamp, screen_id)) = visits.next() {
        let duration = visits
            .peek()
            .map_or(default_dwell, |(next, _)| seconds_between(timestamp, *next));
        entries.push(TimelineEntry {
            screen_id,
            timestamp,
            duration,
        });
    }
    entries
}

#[allow(clippy::cast_precision_loss)]
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1_000_000_000.0
}
