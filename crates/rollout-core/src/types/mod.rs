//! Shared directory record types used by the resolver, directories and reports.

use serde::{Deserialize, Serialize};

/// A managed application known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub id: u64,
    pub name: String,
    /// Catalog version currently published for the app.
    pub version: String,
    pub bundle_id: String,
}

/// A named collection of devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: u64,
    pub name: String,
    /// Membership is computed by the directory from criteria.
    #[serde(default)]
    pub is_smart: bool,
}

/// A group membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// One device's installed copy of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInventoryEntry {
    pub app_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

/// Installed-application inventory of a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInventory {
    pub device_id: u64,
    pub device_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub entries: Vec<DeviceInventoryEntry>,
}

impl DeviceInventory {
    /// First entry whose app name equals `app_name` exactly.
    ///
    /// The whole entry list is scanned.
    pub fn find_app(&self, app_name: &str) -> Option<&DeviceInventoryEntry> {
        self.entries.iter().find(|entry| entry.app_name == app_name)
    }
}

/// Format a location from its building and room parts, skipping empty ones.
pub fn format_location(building: Option<&str>, room: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [building, room]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" / "))
    }
}
