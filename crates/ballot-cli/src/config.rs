//! CLI configuration management.
//!
//! Handles the state file location, logging defaults and the ballot
//! parameters used by `deploy`.

use ballot_governance::BallotConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ballot state file
    pub state_file: PathBuf,
    /// Log filter directive
    pub log_level: String,
    /// Emit logs as JSON
    pub json_logs: bool,
    /// Parameters for newly deployed ballots
    pub ballot: BallotConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_file: base_dir().join("ballot.json"),
            log_level: "warn".to_string(),
            json_logs: false,
            ballot: BallotConfig::default(),
        }
    }
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ballot")
}

impl CliConfig {
    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.ballot.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Get default configuration file path.
    pub fn config_path() -> PathBuf {
        base_dir().join("config.toml")
    }
}
