//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::timeline::TimelineArgs;
use crate::commands::track::TrackArgs;
use crate::commands::transitions::TransitionsArgs;

/// Screen flow analytics.
///
/// Records page views per session and reconstructs how users move between
/// screens: per-session timelines with dwell times, and an aggregated
/// transition graph.
#[derive(Debug, Parser)]
#[command(name = "pf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a single page view.
    Track(TrackArgs),

    /// Import page views as JSONL from stdin.
    ///
    /// Each line is `{"session_id": ..., "screen_id": ..., "timestamp": ...}`.
    /// Nothing is stored unless every line is valid.
    Import,

    /// Write all stored page views as JSONL to stdout.
    Export,

    /// Show per-session timelines with dwell times.
    Timeline(TimelineArgs),

    /// Show the aggregated screen transition graph.
    Transitions(TransitionsArgs),

    /// Show database location and per-session activity.
    Status,
}
