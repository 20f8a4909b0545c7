//! Config store for loading the app-rollout config file.

use std::path::{Path, PathBuf};

use super::{RolloutConfig, parser, paths::default_config_path};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store for the per-user default location.
    pub fn from_default_location() -> anyhow::Result<Self> {
        Ok(Self::from_path(default_config_path()?))
    }

    pub fn from_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, returning an empty one when the file does not exist.
    pub fn load(&self) -> anyhow::Result<RolloutConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                self.config_path.display()
            );
            return Ok(RolloutConfig::new());
        }
        parser::parse_config_toml(&self.config_path)
    }
}
