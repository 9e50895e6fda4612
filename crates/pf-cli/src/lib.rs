//! Screen flow analytics CLI library.
//!
//! This crate provides the CLI interface for recording page views and
//! querying session timelines and transition graphs.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
