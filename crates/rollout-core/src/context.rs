//! Application context for unified dependency injection.

use std::path::Path;

use anyhow::Context;

use crate::config::{ConfigError, ConfigStore, JamfOverrides, JamfSettings, RolloutConfig};
use crate::directory::{DeviceDirectory, InMemoryDirectory, JamfDirectory};
use crate::error::{DeliveryError, DirectoryScope, RolloutError};
use crate::notify::SmtpNotifier;

/// Unified application context.
///
/// Holds the loaded configuration and command-line overrides. Frontends
/// create this once and ask it for the directory and notifier they need.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: RolloutConfig,
    overrides: JamfOverrides,
}

impl AppContext {
    /// Load configuration from `store`.
    pub fn load(store: &ConfigStore, overrides: JamfOverrides) -> anyhow::Result<Self> {
        let config = store.load()?;
        Ok(Self::with_config(config, overrides))
    }

    /// Create a context from an already-loaded configuration.
    pub fn with_config(config: RolloutConfig, overrides: JamfOverrides) -> Self {
        Self { config, overrides }
    }

    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    /// Resolve Jamf settings (flags, then environment, then file).
    pub fn jamf_settings(&self) -> Result<JamfSettings, ConfigError> {
        JamfSettings::resolve(&self.overrides, &self.config.jamf)
    }

    /// Directory to resolve against: a snapshot file when given, Jamf otherwise.
    pub fn directory(&self, snapshot: Option<&Path>) -> anyhow::Result<Box<dyn DeviceDirectory>> {
        if let Some(path) = snapshot {
            tracing::info!("Using directory snapshot {}", path.display());
            let directory = InMemoryDirectory::from_snapshot_file(path)
                .map_err(|e| RolloutError::directory(DirectoryScope::Listing, e))?;
            return Ok(Box::new(directory));
        }

        let settings = self.jamf_settings()?;
        tracing::debug!(
            "Connecting to {} as {}",
            settings.credentials.server(),
            settings.credentials.user()
        );
        let directory = JamfDirectory::new(settings.credentials, settings.timeout)
            .context("Failed to set up Jamf connection")?;
        Ok(Box::new(directory))
    }

    /// Mail notifier configured from `[MAIL_CONFIG]`.
    pub fn mail_notifier(&self, subject: impl Into<String>) -> Result<SmtpNotifier, DeliveryError> {
        SmtpNotifier::from_mail_config(&self.config.mail, subject)
    }
}
