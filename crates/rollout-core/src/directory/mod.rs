//! Read-only access to the device-management directory.
//!
//! The resolver only ever talks to a [`DeviceDirectory`]. Two implementations
//! are provided:
//! - [`JamfDirectory`]: Jamf Pro Classic API over blocking HTTPS
//! - [`InMemoryDirectory`]: a directory snapshot, built in code or loaded
//!   from a JSON file

pub mod jamf;
pub mod memory;

pub use jamf::{JamfCredentials, JamfDirectory};
pub use memory::{DirectorySnapshot, InMemoryDirectory};

use crate::error::DirectoryError;
use crate::types::{AppRecord, DeviceGroup, DeviceInventory, DeviceRef};

/// Read-only lookups against a device-management directory.
pub trait DeviceDirectory {
    /// Full app catalog listing.
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError>;

    /// Full device group listing.
    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError>;

    /// Members of a group, in directory order.
    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError>;

    /// Installed-application inventory of one device.
    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError>;

    /// First app whose name equals `name` exactly (case-sensitive).
    fn find_app_by_name(&self, name: &str) -> Result<Option<AppRecord>, DirectoryError> {
        Ok(self.list_apps()?.into_iter().find(|app| app.name == name))
    }

    /// First group whose name equals `name` exactly (case-sensitive).
    fn find_group_by_name(&self, name: &str) -> Result<Option<DeviceGroup>, DirectoryError> {
        Ok(self
            .list_groups()?
            .into_iter()
            .find(|group| group.name == name))
    }
}

impl<D: DeviceDirectory + ?Sized> DeviceDirectory for &D {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        (**self).list_apps()
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        (**self).list_groups()
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        (**self).fetch_group_members(group_id)
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        (**self).fetch_device_inventory(device_id)
    }

    fn find_app_by_name(&self, name: &str) -> Result<Option<AppRecord>, DirectoryError> {
        (**self).find_app_by_name(name)
    }

    fn find_group_by_name(&self, name: &str) -> Result<Option<DeviceGroup>, DirectoryError> {
        (**self).find_group_by_name(name)
    }
}

impl<D: DeviceDirectory + ?Sized> DeviceDirectory for Box<D> {
    fn list_apps(&self) -> Result<Vec<AppRecord>, DirectoryError> {
        (**self).list_apps()
    }

    fn list_groups(&self) -> Result<Vec<DeviceGroup>, DirectoryError> {
        (**self).list_groups()
    }

    fn fetch_group_members(&self, group_id: u64) -> Result<Vec<DeviceRef>, DirectoryError> {
        (**self).fetch_group_members(group_id)
    }

    fn fetch_device_inventory(&self, device_id: u64) -> Result<DeviceInventory, DirectoryError> {
        (**self).fetch_device_inventory(device_id)
    }

    fn find_app_by_name(&self, name: &str) -> Result<Option<AppRecord>, DirectoryError> {
        (**self).find_app_by_name(name)
    }

    fn find_group_by_name(&self, name: &str) -> Result<Option<DeviceGroup>, DirectoryError> {
        (**self).find_group_by_name(name)
    }
}
