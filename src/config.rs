//! Configuration management for git-conductor
//!
//! Stores user preferences in a JSON file under the user's config directory.
//! Command line flags override what the file says.

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::git::{DEFAULT_COMMIT_MESSAGE, OrchestratorSettings};

/// Directory under the platform config dir holding the config file
pub const CONFIG_DIR_NAME: &str = "git-conductor";

/// The name of the config file
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Version of the config file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Commit message used when push commits pending changes
    #[serde(default = "default_commit_message")]
    pub default_commit_message: String,

    /// Kill git commands that run longer than this (no limit when unset)
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,

    /// Flags added to clone when none are given on the command line
    #[serde(default)]
    pub clone_flags: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_commit_message: default_commit_message(),
            command_timeout_secs: None,
            clone_flags: vec![],
        }
    }
}

impl Config {
    /// Location of the config file in the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load config from a file, or use defaults if it doesn't exist
    pub fn load(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file, creating its directory if needed
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            default_commit_message: self.default_commit_message.clone(),
        }
    }
}
