//! In-memory directory snapshot.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DeviceDirectory;
use crate::error::DirectoryError;
use crate::types::{AppRecord, DeviceGroup, DeviceInventory, DeviceRef};

/// Serialized form of a directory snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub apps: Vec<AppRecord>,
    #[serde(default)]
    pub groups: Vec<SnapshotGroup>,
    #[serde(default)]
    pub devices: Vec<DeviceInventory>,
    /// Device ids whose inventory fetch always fails with a transport error.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failing_devices: Vec<u64>,
}

/// A group together with its membership list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_smart: bool,
    #[serde(default)]
    pub members: Vec<DeviceRef>,
}

/// Directory backed by plain collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    apps: Vec<AppRecord>,
    groups: Vec<DeviceGroup>,
    members: HashMap<u64, Vec<DeviceRef>>,
    inventories: HashMap<u64, DeviceInventory>,
    failing: BTreeSet<u64>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file.
    pub fn from_snapshot_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::Snapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        let snapshot: DirectorySnapshot = serde_json::from_str(&content).map_err(|e| {
            DirectoryError::Snapshot(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        let mut directory = Self::new();
        for app in snapshot.apps {
            directory = directory.with_app(app);
        }
        for group in snapshot.groups {
            directory = directory.with_group(
                DeviceGroup {
                    id: group.id,
                    name: group.name,
                    is_smart: group.is_smart,
                },
                group.members,
            );
        }
        for inventory in snapshot.devices {
            directory = directory.with_inventory(inventory);
        }
        for device_id in snapshot.failing_devices {
            directory = directory.with_failing_device(device_id);
        }
        directory
    }

    pub fn with_app(mut self, app: AppRecord) -> Self {
        self.apps.push(app);
        self
    }

    pub fn with_group(mut self, group: DeviceGroup, members: Vec<DeviceRef>) -> Self {
        self.members.insert(group.id, members);
        self.groups.push(group);
        self
    }

    pub fn with_inventory(mut self, inventory: DeviceInventory) -> Self {
        self.inventories.insert(inventory.device_id, inventory);
        self
    }

    /// Make every inventory fetch for `device_id` fail with a transport error.
    pub fn with_failing_device(mut self, device_id: u64) -> Self {
        self.failing.insert(device_id);
        self
    }
}

impl DeviceDirectory for InMemoryDirectory {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        Ok(self.apps.clone())
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        Ok(self.groups.clone())
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        self.members
            .get(&group_id)
            .cloned()
            .ok_or(DirectoryError::UnknownGroup(group_id))
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        if self.failing.contains(&device_id) {
            return Err(DirectoryError::Transport {
                url: format!("memory://mobiledevices/id/{device_id}"),
                message: "connection reset".to_string(),
            });
        }
        self.inventories
            .get(&device_id)
            .cloned()
            .ok_or(DirectoryError::UnknownDevice(device_id))
    }
}
