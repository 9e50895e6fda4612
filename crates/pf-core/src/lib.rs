//! Core domain logic for screen flow analytics.
//!
//! This crate contains the fundamental types and logic for:
//! - Timelines: ordering each session's page views and inferring dwell time
//! - Transitions: counting consecutive screen pairs into a weighted graph
//! - Event stores: the interface snapshots are read through

mod analysis;
pub mod event;
pub mod store;
pub mod timeline;
pub mod transition;
pub mod types;

pub use analysis::{FlowAnalysis, SnapshotError, analyze, analyze_store};
pub use event::{
    Event, FlowError, MalformedEventError, RawEvent, format_timestamp, format_timestamp_precise,
    parse_timestamp,
};
pub use store::{EventStore, MemoryStore};
pub use timeline::{
    DEFAULT_DWELL_SECS, SessionTimeline, TimelineBuilder, TimelineConfig, TimelineEntry,
};
pub use transition::{
    IndexedLink, TransitionAggregator, TransitionEdge, TransitionGraph, isolated_screens,
};
pub use types::{ScreenId, SessionId, ValidationError};
