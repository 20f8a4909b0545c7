//! Jamf Pro Classic API directory.
//!
//! Talks to `/JSSResource` endpoints with basic auth and
//! `Accept: application/json`. All calls are blocking.

pub mod schema;

use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use super::DeviceDirectory;
use crate::error::DirectoryError;
use crate::types::{AppRecord, DeviceGroup, DeviceInventory, DeviceRef};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Jamf Pro server.
#[derive(Clone)]
pub struct JamfCredentials {
    server: Url,
    user: String,
    password: String,
}

impl JamfCredentials {
    /// Build credentials, accepting a bare host name as `https://<host>`.
    pub fn new(
        server: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let server = normalize_server_url(server)?;
        Ok(Self {
            server,
            user: user.into(),
            password: password.into(),
        })
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl std::fmt::Debug for JamfCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JamfCredentials")
            .field("server", &self.server.as_str())
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse a server URL, defaulting the scheme to https.
pub fn normalize_server_url(server: &str) -> anyhow::Result<Url> {
    let server = server.trim();
    if server.is_empty() {
        anyhow::bail!("Jamf server URL is empty");
    }

    let with_scheme = if server.contains("://") {
        server.to_string()
    } else {
        format!("https://{server}")
    };

    let url = Url::parse(&with_scheme)
        .with_context(|| format!("Invalid Jamf server URL: {server}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Unsupported Jamf server URL scheme: {}", url.scheme());
    }

    Ok(url)
}

/// Device directory backed by the Jamf Pro Classic API.
pub struct JamfDirectory {
    client: Client,
    credentials: JamfCredentials,
}

impl JamfDirectory {
    pub fn new(credentials: JamfCredentials, timeout: Duration) -> anyhow::Result<Self> {
        Self::from_builder(credentials, Client::builder().timeout(timeout))
    }

    /// Build on a caller-supplied client builder (proxy, TLS or timeout tweaks).
    pub fn from_builder(
        credentials: JamfCredentials,
        builder: ClientBuilder,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = builder
            .user_agent(concat!("app-rollout/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Full URL for a `JSSResource` path.
    pub fn endpoint(&self, path: &str) -> String {
        resource_url(&self.credentials.server, path)
    }

    fn get_json(&self, path: &str) -> Result<(Value, String), DirectoryError> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .map_err(|e| DirectoryError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .json::<Value>()
            .map_err(|e| DirectoryError::Malformed {
                url: url.clone(),
                message: e.to_string(),
            })?;

        Ok((body, url))
    }
}

/// Join a server base URL and a `JSSResource` path.
pub fn resource_url(server: &Url, path: &str) -> String {
    format!(
        "{}/JSSResource/{}",
        server.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl DeviceDirectory for JamfDirectory {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        let (body, url) = self.get_json("mobiledeviceapplications")?;
        schema::parse_app_listing(&body, &url)
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        let (body, url) = self.get_json("mobiledevicegroups")?;
        schema::parse_group_listing(&body, &url)
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        let (body, url) = self.get_json(&format!("mobiledevicegroups/id/{group_id}"))?;
        schema::parse_group_members(&body, &url)
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        let (body, url) = self.get_json(&format!(
            "mobiledevices/id/{device_id}/subset/General&Location&Applications"
        ))?;
        schema::parse_device_inventory(&body, device_id, &url)
    }
}
