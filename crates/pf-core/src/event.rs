//! Page-view events and their unvalidated wire form.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ScreenId, SessionId, ValidationError};

/// Naive datetime layouts accepted when a timestamp carries no UTC offset.
///
/// Naive values are interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// One observed page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The visit this page view belongs to.
    pub session_id: SessionId,
    /// The screen that was shown.
    pub screen_id: ScreenId,
    /// When the screen was shown.
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub const fn new(session_id: SessionId, screen_id: ScreenId, timestamp: DateTime<Utc>) -> Self {
        Self {
            session_id,
            screen_id,
            timestamp,
        }
    }
}

/// A page view as it arrives from storage or a request body.
///
/// Fields are kept as text so that a whole batch can be validated at once,
/// with errors pointing at the offending record. Missing fields deserialize
/// to empty strings and are rejected by [`RawEvent::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub screen_id: String,
    #[serde(default)]
    pub timestamp: String,
}

impl RawEvent {
    pub fn new(
        session_id: impl Into<String>,
        screen_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            screen_id: screen_id.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Validates identifiers and parses the timestamp.
    ///
    /// `position` is the record's index in its batch and is carried into any
    /// error.
    pub fn validate(&self, position: usize) -> Result<Event, FlowError> {
        let session_id = SessionId::new(self.session_id.as_str())
            .map_err(|error| FlowError::Validation { position, error })?;
        let screen_id = ScreenId::new(self.screen_id.as_str())
            .map_err(|error| FlowError::Validation { position, error })?;
        let timestamp = parse_timestamp(&self.timestamp).map_err(|source| {
            FlowError::MalformedEvent(MalformedEventError {
                position,
                session_id: self.session_id.clone(),
                timestamp: self.timestamp.clone(),
                source,
            })
        })?;
        Ok(Event::new(session_id, screen_id, timestamp))
    }
}

impl From<&Event> for RawEvent {
    fn from(event: &Event) -> Self {
        Self {
            session_id: event.session_id.to_string(),
            screen_id: event.screen_id.to_string(),
            timestamp: format_timestamp_precise(event.timestamp),
        }
    }
}

/// An event whose timestamp could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed timestamp {timestamp:?} for session {session_id:?} at position {position}")]
pub struct MalformedEventError {
    pub position: usize,
    pub session_id: String,
    pub timestamp: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Errors that fail a whole batch of events.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// An identifier was missing or empty.
    #[error("invalid event at position {position}: {error}")]
    Validation {
        position: usize,
        error: ValidationError,
    },

    /// A timestamp was missing or unparsable.
    #[error(transparent)]
    MalformedEvent(#[from] MalformedEventError),
}

impl FlowError {
    /// Index of the offending record within its batch.
    pub const fn position(&self) -> usize {
        match self {
            Self::Validation { position, .. } => *position,
            Self::MalformedEvent(err) => err.position,
        }
    }
}

/// Parses an ISO-8601 timestamp.
///
/// RFC 3339 values with an offset are converted to UTC; naive values
/// (`2025-01-01T12:00:00.123456`, `2025-01-01 12:00:00`) are taken as UTC.
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|err| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
                .map(|naive| naive.and_utc())
                .ok_or(err)
        })
}

/// Formats a timestamp as RFC 3339 UTC with millisecond precision, for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats a timestamp as RFC 3339 UTC with nanosecond precision.
///
/// This is the stored form. It is lossless and fixed-width, so text order
/// matches time order.
pub fn format_timestamp_precise(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
