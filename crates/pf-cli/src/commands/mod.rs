//! CLI subcommand implementations.

pub mod export;
pub mod import;
pub mod status;
pub mod timeline;
pub mod track;
pub mod transitions;
pub mod util;
