//! Configuration schema for the app-rollout config file
//!
//! ```toml
//! [jamf]
//! server = "https://example.jamfcloud.com"
//! user = "api-user"
//! password = "secret"
//!
//! [MAIL_CONFIG]
//! SENDER_EMAIL = "ops@example.com"
//! SENDER_PASSWD = "app-password"
//! RECIPIENT_EMAIL = "it@example.com"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::directory::jamf::normalize_server_url;

/// Default SMTP relay used when the mail section does not name one.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Directory connection settings
    #[serde(default)]
    pub jamf: JamfSection,

    /// Notifier settings, consumed only by the mail notifier
    #[serde(default, rename = "MAIL_CONFIG")]
    pub mail: MailConfig,
}

/// `[jamf]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JamfSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[MAIL_CONFIG]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default, rename = "SENDER_EMAIL", skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,

    #[serde(default, rename = "SENDER_PASSWD", skip_serializing_if = "Option::is_none")]
    pub sender_password: Option<String>,

    #[serde(default, rename = "RECIPIENT_EMAIL", skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,

    #[serde(default, rename = "SMTP_HOST", skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,

    #[serde(default, rename = "SMTP_PORT", skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
}

impl MailConfig {
    /// Names of required keys that are missing or empty.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("SENDER_EMAIL", &self.sender_email),
            ("SENDER_PASSWD", &self.sender_password),
            ("RECIPIENT_EMAIL", &self.recipient_email),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(key, _)| key)
        .collect()
    }

    pub fn smtp_host(&self) -> &str {
        self.smtp_host.as_deref().unwrap_or(DEFAULT_SMTP_HOST)
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
    }
}

impl RolloutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate values that parse but cannot work.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(server) = &self.jamf.server {
            normalize_server_url(server).context("Invalid [jamf] server")?;
        }
        if self.jamf.timeout_secs == Some(0) {
            anyhow::bail!("Invalid [jamf] timeout_secs: must be greater than zero");
        }
        if self.mail.smtp_port == Some(0) {
            anyhow::bail!("Invalid [MAIL_CONFIG] SMTP_PORT: must be greater than zero");
        }
        Ok(())
    }
}
