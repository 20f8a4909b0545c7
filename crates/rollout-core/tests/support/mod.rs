#![allow(dead_code)]

use std::cell::RefCell;

use rollout_core::directory::{DeviceDirectory, InMemoryDirectory};
use rollout_core::error::DirectoryError;
use rollout_core::types::{AppRecord, DeviceGroup, DeviceInventory, DeviceInventoryEntry, DeviceRef};

pub const RETAIL_GROUP: &str = "Retail App Deployment Group 2.0";

pub fn retail_app(version: &str) -> AppRecord {
    AppRecord {
        id: 12,
        name: "Retail App".to_string(),
        version: version.to_string(),
        bundle_id: "com.example.retail".to_string(),
    }
}

pub fn device(id: u64, name: &str) -> DeviceRef {
    DeviceRef {
        id,
        name: name.to_string(),
    }
}

pub fn inventory(id: u64, name: &str, apps: &[(&str, &str)]) -> DeviceInventory {
    DeviceInventory {
        device_id: id,
        device_name: name.to_string(),
        location: Some("Store 14 / Back Office".to_string()),
        entries: apps
            .iter()
            .map(|(app, version)| DeviceInventoryEntry {
                app_name: app.to_string(),
                version: version.to_string(),
                bundle_id: None,
            })
            .collect(),
    }
}

/// Three devices on the current version, one behind, one without the app.
pub fn retail_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_app(AppRecord {
            id: 3,
            name: "Inventory Scanner".to_string(),
            version: "5.1".to_string(),
            bundle_id: "com.example.scanner".to_string(),
        })
        .with_app(retail_app("2.0"))
        .with_group(
            DeviceGroup {
                id: 56,
                name: RETAIL_GROUP.to_string(),
                is_smart: true,
            },
            vec![
                device(101, "iPad-101"),
                device(102, "iPad-102"),
                device(103, "iPad-103"),
                device(104, "iPad-104"),
                device(105, "iPad-105"),
            ],
        )
        .with_inventory(inventory(101, "iPad-101", &[("Retail App", "2.0")]))
        .with_inventory(inventory(
            102,
            "iPad-102",
            &[("Inventory Scanner", "5.1"), ("Retail App", "2.0")],
        ))
        .with_inventory(inventory(103, "iPad-103", &[("Retail App", "2.0.0")]))
        .with_inventory(inventory(104, "iPad-104", &[("Retail App", "1.9")]))
        .with_inventory(inventory(105, "iPad-105", &[("Inventory Scanner", "5.1")]))
}

/// Wraps a directory and records every call made against it.
pub struct RecordingDirectory<D> {
    inner: D,
    calls: RefCell<Vec<String>>,
}

impl<D: DeviceDirectory> RecordingDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl<D: DeviceDirectory> DeviceDirectory for RecordingDirectory<D> {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        self.record("list_apps".to_string());
        self.inner.list_apps()
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        self.record("list_groups".to_string());
        self.inner.list_groups()
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        self.record(format!("fetch_group_members:{group_id}"));
        self.inner.fetch_group_members(group_id)
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        self.record(format!("fetch_device_inventory:{device_id}"));
        self.inner.fetch_device_inventory(device_id)
    }
}

/// Directory whose app listing cannot be decoded.
pub struct MalformedListing;

impl DeviceDirectory for MalformedListing {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        Err(DirectoryError::Malformed {
            url: "memory://mobiledeviceapplications".to_string(),
            message: "expected object".to_string(),
        })
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        Ok(Vec::new())
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        Err(DirectoryError::UnknownGroup(group_id))
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        Err(DirectoryError::UnknownDevice(device_id))
    }
}
