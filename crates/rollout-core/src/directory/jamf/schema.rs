//! Jamf Pro Classic API response shapes.
//!
//! The Classic API is inconsistent about list encoding depending on how the
//! JSON was produced:
//! - `{"mobile_device_applications": [ {...}, ... ]}`
//! - `{"mobile_device_applications": {"size": "2", "mobile_device_application": [ ... ]}}`
//! - the inner list collapsed to a single object when it has one element
//!
//! [`extract_list`] normalises all of them before items are decoded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DirectoryError;
use crate::types::{
    AppRecord, DeviceGroup, DeviceInventory, DeviceInventoryEntry, DeviceRef, format_location,
};

#[derive(Debug, Deserialize)]
struct AppItem {
    #[serde(deserialize_with = "de_id")]
    id: u64,
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    bundle_id: String,
}

#[derive(Debug, Deserialize)]
struct GroupItem {
    #[serde(deserialize_with = "de_id")]
    id: u64,
    name: String,
    #[serde(default, deserialize_with = "de_bool")]
    is_smart: bool,
}

#[derive(Debug, Deserialize)]
struct MemberItem {
    #[serde(deserialize_with = "de_id")]
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct GeneralSection {
    #[serde(default, deserialize_with = "de_opt_id")]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    device_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LocationSection {
    #[serde(default)]
    building: Option<String>,
    #[serde(default)]
    room: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplicationItem {
    application_name: String,
    #[serde(default)]
    application_version: Option<String>,
    #[serde(default)]
    application_short_version: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
}

impl ApplicationItem {
    /// Marketing version when reported, build version otherwise.
    fn into_entry(self) -> DeviceInventoryEntry {
        let version = self
            .application_short_version
            .filter(|v| !v.trim().is_empty())
            .or(self.application_version)
            .unwrap_or_default();

        DeviceInventoryEntry {
            app_name: self.application_name,
            version,
            bundle_id: self.identifier.filter(|id| !id.is_empty()),
        }
    }
}

/// Parse the `mobiledeviceapplications` listing.
pub fn parse_app_listing(body: &Value, url: &str) -> Result<Vec<AppRecord>, DirectoryError> {
    let items = extract_list(
        body,
        "mobile_device_applications",
        "mobile_device_application",
        url,
    )?
    .ok_or_else(|| malformed(url, "missing mobile_device_applications"))?;

    items
        .into_iter()
        .map(|item| {
            let app: AppItem = decode(item, url)?;
            Ok(AppRecord {
                id: app.id,
                name: app.name,
                version: app.version,
                bundle_id: app.bundle_id,
            })
        })
        .collect()
}

/// Parse the `mobiledevicegroups` listing.
pub fn parse_group_listing(body: &Value, url: &str) -> Result<Vec<DeviceGroup>, DirectoryError> {
    let items = extract_list(body, "mobile_device_groups", "mobile_device_group", url)?
        .ok_or_else(|| malformed(url, "missing mobile_device_groups"))?;

    items
        .into_iter()
        .map(|item| {
            let group: GroupItem = decode(item, url)?;
            Ok(DeviceGroup {
                id: group.id,
                name: group.name,
                is_smart: group.is_smart,
            })
        })
        .collect()
}

/// Parse the member list out of a `mobiledevicegroups/id/{id}` record.
pub fn parse_group_members(body: &Value, url: &str) -> Result<Vec<DeviceRef>, DirectoryError> {
    let group = body
        .get("mobile_device_group")
        .ok_or_else(|| malformed(url, "missing mobile_device_group"))?;

    // A group with no members may omit the list entirely
    let items = extract_list(group, "mobile_devices", "mobile_device", url)?.unwrap_or_default();

    items
        .into_iter()
        .map(|item| {
            let member: MemberItem = decode(item, url)?;
            Ok(DeviceRef {
                id: member.id,
                name: member.name,
            })
        })
        .collect()
}

/// Parse a `mobiledevices/id/{id}` record into an inventory.
pub fn parse_device_inventory(
    body: &Value,
    device_id: u64,
    url: &str,
) -> Result<DeviceInventory, DirectoryError> {
    let device = body
        .get("mobile_device")
        .ok_or_else(|| malformed(url, "missing mobile_device"))?;

    let general: GeneralSection = match device.get("general") {
        Some(value) => decode(value.clone(), url)?,
        None => GeneralSection::default(),
    };
    let location: LocationSection = match device.get("location") {
        Some(value) => decode(value.clone(), url)?,
        None => LocationSection::default(),
    };

    let entries = extract_list(device, "applications", "application", url)?
        .unwrap_or_default()
        .into_iter()
        .map(|item| decode::<ApplicationItem>(item, url).map(ApplicationItem::into_entry))
        .collect::<Result<Vec<_>, _>>()?;

    let device_name = general
        .name
        .or(general.device_name)
        .unwrap_or_else(|| format!("device-{device_id}"));

    Ok(DeviceInventory {
        device_id: general.id.unwrap_or(device_id),
        device_name,
        location: format_location(location.building.as_deref(), location.room.as_deref()),
        entries,
    })
}

/// Normalise a Classic API list found under `outer` (optionally wrapped in `inner`).
///
/// Returns `Ok(None)` when `outer` is absent. A scalar where a list belongs
/// is malformed.
pub fn extract_list(
    body: &Value,
    outer: &str,
    inner: &str,
    url: &str,
) -> Result<Option<Vec<Value>>, DirectoryError> {
    let Some(value) = body.get(outer) else {
        return Ok(None);
    };

    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get(inner) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) => Vec::new(),
            Some(single @ Value::Object(_)) => vec![single.clone()],
            Some(other) => {
                return Err(malformed(url, format!("{outer}.{inner} is not a list: {other}")));
            }
            None if map.is_empty() || map.contains_key("size") => Vec::new(),
            None => vec![value.clone()],
        },
        other => return Err(malformed(url, format!("{outer} is not a list: {other}"))),
    };
    Ok(Some(items))
}

fn decode<T: DeserializeOwned>(item: Value, url: &str) -> Result<T, DirectoryError> {
    serde_json::from_value(item).map_err(|e| malformed(url, e.to_string()))
}

fn malformed(url: &str, message: impl Into<String>) -> DirectoryError {
    DirectoryError::Malformed {
        url: url.to_string(),
        message: message.into(),
    }
}

/// Ids arrive as numbers from JSON endpoints and as strings from XML conversions.
fn de_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing id"))
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s}"))),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

fn de_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid bool: {other}"))),
    }
}
