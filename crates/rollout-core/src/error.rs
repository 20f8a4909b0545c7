//! Error taxonomy for directory access, resolution and delivery.

use std::fmt;

use thiserror::Error;

/// Which exact-name lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    App,
    Group,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::App => f.write_str("app"),
            LookupKind::Group => f.write_str("group"),
        }
    }
}

/// Directory operation during which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryScope {
    /// Fetching the app listing.
    Listing,
    /// Fetching the group listing or a group's member list.
    GroupLookup,
    /// Fetching one device's inventory.
    DeviceFetch,
}

impl fmt::Display for DirectoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryScope::Listing => f.write_str("listing"),
            DirectoryScope::GroupLookup => f.write_str("group-lookup"),
            DirectoryScope::DeviceFetch => f.write_str("device-fetch"),
        }
    }
}

/// Transport or parse failure reported by a device directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("no device group with id {0}")]
    UnknownGroup(u64),

    #[error("no inventory for device {0}")]
    UnknownDevice(u64),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Resolution failure surfaced to callers.
#[derive(Error, Debug)]
pub enum RolloutError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: LookupKind, name: String },

    #[error("directory error during {scope}: {source}")]
    Directory {
        scope: DirectoryScope,
        #[source]
        source: DirectoryError,
    },
}

impl RolloutError {
    pub fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn directory(scope: DirectoryScope, source: DirectoryError) -> Self {
        Self::Directory { scope, source }
    }

    /// Suggested process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RolloutError::NotFound { .. } => 1,
            RolloutError::Directory { .. } => 2,
        }
    }
}

/// Notifier failure. Always recovered locally.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("mail is not configured: {0}")]
    NotConfigured(String),

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to send message: {0}")]
    Transport(String),
}
