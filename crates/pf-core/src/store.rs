//! The event store seen from the core.

use crate::event::{Event, RawEvent};

/// Append-only storage of page-view events.
///
/// This trait lets callers feed the core from different backends
/// (e.g., `Database` from pf-db, or in-memory fixtures).
pub trait EventStore {
    /// Error returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends one event.
    fn append(&mut self, event: &Event) -> Result<(), Self::Error>;

    /// Returns every stored event in append order.
    ///
    /// Records are returned unvalidated; the core validates the snapshot as
    /// a whole.
    fn list_all(&self) -> Result<Vec<RawEvent>, Self::Error>;
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<RawEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record without validating it.
    pub fn push_raw(&mut self, event: RawEvent) {
        self.events.push(event);
    }
}

impl EventStore for MemoryStore {
    type Error = std::convert::Infallible;

    fn append(&mut self, event: &Event) -> Result<(), Self::Error> {
        self.events.push(RawEvent::from(event));
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<RawEvent>, Self::Error> {
        Ok(self.events.clone())
    }
}
