//! Configuration loading and settings resolution
//!
//! Jamf connection settings are layered, highest precedence first:
//! - command-line flags
//! - environment (`JAMF_SERVER`, `JAMF_USER`, `JAMF_PASSWORD`)
//! - the `[jamf]` section of the config file
//!
//! The `[MAIL_CONFIG]` section is read from the file only.

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use std::time::Duration;

use thiserror::Error;

pub use parser::{parse_config_toml, parse_config_toml_str};
pub use paths::{config_path_in, default_config_path};
pub use schema::{JamfSection, MailConfig, RolloutConfig};
pub use store::ConfigStore;

use crate::directory::jamf::{DEFAULT_TIMEOUT, JamfCredentials};

pub const ENV_JAMF_SERVER: &str = "JAMF_SERVER";
pub const ENV_JAMF_USER: &str = "JAMF_USER";
pub const ENV_JAMF_PASSWORD: &str = "JAMF_PASSWORD";

/// Settings that cannot be used to build a directory connection.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no Jamf {setting} configured (use --{flag}, {env}, or [jamf] {setting} in the config file)")]
    Missing {
        setting: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("invalid Jamf settings: {0}")]
    Invalid(String),
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct JamfOverrides {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Fully resolved Jamf connection settings.
#[derive(Debug, Clone)]
pub struct JamfSettings {
    pub credentials: JamfCredentials,
    pub timeout: Duration,
}

impl JamfSettings {
    /// Resolve settings from flags, the process environment and the file.
    pub fn resolve(overrides: &JamfOverrides, file: &JamfSection) -> Result<Self, ConfigError> {
        Self::resolve_with_env(overrides, file, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve_with_env<F>(
        overrides: &JamfOverrides,
        file: &JamfSection,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: &Option<String>, key: &str, from_file: &Option<String>| {
            flag.clone()
                .or_else(|| env(key))
                .or_else(|| from_file.clone())
                .filter(|value| !value.trim().is_empty())
        };

        let server = pick(&overrides.server, ENV_JAMF_SERVER, &file.server)
            .ok_or(ConfigError::Missing {
                setting: "server",
                flag: "jamfserver",
                env: ENV_JAMF_SERVER,
            })?;
        let user = pick(&overrides.user, ENV_JAMF_USER, &file.user)
            .ok_or(ConfigError::Missing {
                setting: "user",
                flag: "jamfuser",
                env: ENV_JAMF_USER,
            })?;
        let password = pick(&overrides.password, ENV_JAMF_PASSWORD, &file.password)
            .ok_or(ConfigError::Missing {
                setting: "password",
                flag: "jamfpass",
                env: ENV_JAMF_PASSWORD,
            })?;

        let credentials = JamfCredentials::new(&server, user, password)
            .map_err(|e| ConfigError::Invalid(format!("{e:#}")))?;
        let timeout = file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            credentials,
            timeout,
        })
    }
}
