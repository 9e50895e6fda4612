//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pf_core::{DEFAULT_DWELL_SECS, TimelineConfig, ValidationError};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Dwell assigned to the last screen of each session, in seconds.
    pub default_dwell_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("pf.db"),
            default_dwell_secs: DEFAULT_DWELL_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from default locations, optionally merging a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PF_*)
        figment = figment.merge(Env::prefixed("PF_"));

        figment.extract()
    }

    /// Timeline settings derived from this configuration.
    pub fn timeline_config(&self) -> Result<TimelineConfig, ValidationError> {
        TimelineConfig::new(self.default_dwell_secs)
    }
}

/// Returns the platform-specific config directory for pf.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pf"))
}

/// Returns the platform-specific data directory for pf.
///
/// On Linux: `~/.local/share/pf`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pf"))
}
