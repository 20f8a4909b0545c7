//! Deployment status resolution for an app across a device group.
//!
//! This module provides:
//! - per-device classification against a target version
//! - aggregation into an immutable [`DeploymentReport`]
//! - the recommended next rollout action derived from the counts

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::DeviceDirectory;
use crate::error::{DirectoryScope, LookupKind, RolloutError};
use crate::types::{AppRecord, DeviceGroup, DeviceInventoryEntry, DeviceRef};
use crate::version::versions_match;

// =============================================================================
// Data Structures
// =============================================================================

/// A device's status relative to the target app version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Target version installed
    UpToDate,
    /// App installed at another version
    Outdated,
    /// App not installed
    Missing,
    /// Inventory could not be fetched
    Unknown,
}

/// Per-classification device counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub up_to_date: usize,
    pub outdated: usize,
    pub missing: usize,
    pub unknown: usize,
}

impl ClassificationCounts {
    pub fn total(&self) -> usize {
        self.up_to_date + self.outdated + self.missing + self.unknown
    }

    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::UpToDate => self.up_to_date += 1,
            Classification::Outdated => self.outdated += 1,
            Classification::Missing => self.missing += 1,
            Classification::Unknown => self.unknown += 1,
        }
    }
}

/// Next step for the rollout, derived from the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    /// Nothing to act on (empty group, or no device could be inspected)
    NoOp,
    /// No device has the target version yet
    BeginRollout,
    /// Some devices have the target version
    ContinueRollout,
    /// Every device has the target version
    RolloutComplete,
}

impl RecommendedAction {
    pub fn from_counts(counts: &ClassificationCounts) -> Self {
        let total = counts.total();
        match counts.up_to_date {
            _ if total == 0 || counts.unknown == total => RecommendedAction::NoOp,
            n if n == total => RecommendedAction::RolloutComplete,
            0 => RecommendedAction::BeginRollout,
            _ => RecommendedAction::ContinueRollout,
        }
    }
}

/// One device's line in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: u64,
    pub device_name: String,
    pub location: Option<String>,
    pub installed_version: Option<String>,
    pub classification: Classification,
    /// Error detail for `Unknown` devices
    pub note: Option<String>,
}

/// Result of a resolution pass. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    app: AppRecord,
    target_version: String,
    group: DeviceGroup,
    counts: ClassificationCounts,
    devices: Vec<DeviceStatus>,
    action: RecommendedAction,
    generated_at: DateTime<Utc>,
}

impl DeploymentReport {
    fn build(
        app: AppRecord,
        target_version: String,
        group: DeviceGroup,
        devices: Vec<DeviceStatus>,
    ) -> Self {
        let mut counts = ClassificationCounts::default();
        for device in &devices {
            counts.record(device.classification);
        }

        Self {
            action: RecommendedAction::from_counts(&counts),
            app,
            target_version,
            group,
            counts,
            devices,
            generated_at: Utc::now(),
        }
    }

    pub fn app(&self) -> &AppRecord {
        &self.app
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    pub fn group(&self) -> &DeviceGroup {
        &self.group
    }

    pub fn counts(&self) -> &ClassificationCounts {
        &self.counts
    }

    /// Per-device details in group membership order.
    pub fn devices(&self) -> &[DeviceStatus] {
        &self.devices
    }

    pub fn action(&self) -> RecommendedAction {
        self.action
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

// Equality ignores generated_at.
impl PartialEq for DeploymentReport {
    fn eq(&self, other: &Self) -> bool {
        self.app == other.app
            && self.target_version == other.target_version
            && self.group == other.group
            && self.counts == other.counts
            && self.devices == other.devices
            && self.action == other.action
    }
}

impl Eq for DeploymentReport {}

/// Behaviour switches for the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    /// Treat a malformed or missing app listing as empty, so the lookup ends
    /// in `NotFound { kind: App }` rather than a directory error.
    pub tolerate_missing_app_list: bool,
}

// =============================================================================
// Core Functions
// =============================================================================

/// Classify a device from its matching inventory entry, if any.
pub fn classify(entry: Option<&DeviceInventoryEntry>, target_version: &str) -> Classification {
    match entry {
        None => Classification::Missing,
        Some(entry) if versions_match(&entry.version, target_version) => {
            Classification::UpToDate
        }
        Some(_) => Classification::Outdated,
    }
}

/// Group name used by the deployment naming convention.
pub fn default_group_name(app_name: &str, app_version: &str) -> String {
    format!("{app_name} Deployment Group {app_version}")
}

/// Resolves the deployment state of an app across a device group.
///
/// Read-only: performs lookups against the directory and nothing else.
pub struct DeploymentStatusResolver<D> {
    directory: D,
    options: ResolverOptions,
}

impl<D: DeviceDirectory> DeploymentStatusResolver<D> {
    pub fn new(directory: D) -> Self {
        Self::with_options(directory, ResolverOptions::default())
    }

    pub fn with_options(directory: D, options: ResolverOptions) -> Self {
        Self { directory, options }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Resolve `app_name` at `target_version` across `group_name`.
    ///
    /// Lookups run app first, then group, then members.
    pub fn resolve(
        &self,
        app_name: &str,
        target_version: &str,
        group_name: &str,
    ) -> Result<DeploymentReport, RolloutError> {
        let app = self.lookup_app(app_name)?;
        let group = self.lookup_group(group_name)?;
        self.resolve_for(app, target_version, group)
    }

    /// Find an app by exact name.
    pub fn lookup_app(&self, app_name: &str) -> Result<AppRecord, RolloutError> {
        let found = match self.directory.find_app_by_name(app_name) {
            Ok(found) => found,
            Err(err) if self.options.tolerate_missing_app_list && is_malformed(&err) => {
                tracing::warn!("Unable to read list of mobile device apps: {}", err);
                None
            }
            Err(err) => {
                tracing::error!("Unable to get list of mobile device apps: {}", err);
                return Err(RolloutError::directory(DirectoryScope::Listing, err));
            }
        };

        match found {
            Some(app) => {
                tracing::info!("Found Mobile Device App entry for {}.", app.name);
                Ok(app)
            }
            None => {
                tracing::info!("Unable to find a mobile app named {}", app_name);
                Err(RolloutError::not_found(LookupKind::App, app_name))
            }
        }
    }

    /// Find a device group by exact name.
    pub fn lookup_group(&self, group_name: &str) -> Result<DeviceGroup, RolloutError> {
        let found = self.directory.find_group_by_name(group_name).map_err(|err| {
            tracing::error!("Unable to get list of mobile device groups: {}", err);
            RolloutError::directory(DirectoryScope::GroupLookup, err)
        })?;

        match found {
            Some(group) => {
                tracing::debug!("Found smart group: {}", group.name);
                Ok(group)
            }
            None => {
                tracing::info!("Unable to find mobile device group: {}", group_name);
                Err(RolloutError::not_found(LookupKind::Group, group_name))
            }
        }
    }

    /// Classify every member of an already-located group.
    pub fn resolve_for(
        &self,
        app: AppRecord,
        target_version: &str,
        group: DeviceGroup,
    ) -> Result<DeploymentReport, RolloutError> {
        let members = self
            .directory
            .fetch_group_members(group.id)
            .map_err(|err| {
                tracing::error!("Unable to get members of group {}: {}", group.name, err);
                RolloutError::directory(DirectoryScope::GroupLookup, err)
            })?;

        let members = dedup_members(members);
        tracing::info!(
            "Checking {} devices in {} for {} {}",
            members.len(),
            group.name,
            app.name,
            target_version
        );

        let devices = members
            .iter()
            .map(|member| self.device_status(member, &app.name, target_version))
            .collect();

        let report = DeploymentReport::build(app, target_version.to_string(), group, devices);
        let counts = report.counts();
        tracing::info!(
            "Resolved {} devices: {} up-to-date, {} outdated, {} missing, {} unknown",
            counts.total(),
            counts.up_to_date,
            counts.outdated,
            counts.missing,
            counts.unknown
        );
        Ok(report)
    }

    fn device_status(&self, member: &DeviceRef, app_name: &str, target_version: &str) -> DeviceStatus {
        match self.directory.fetch_device_inventory(member.id) {
            Ok(inventory) => {
                let entry = inventory.find_app(app_name);
                let classification = classify(entry, target_version);
                tracing::debug!(
                    "{} ({}): {:?}",
                    inventory.device_name,
                    member.id,
                    classification
                );
                DeviceStatus {
                    device_id: member.id,
                    device_name: inventory.device_name.clone(),
                    location: inventory.location.clone(),
                    installed_version: entry.map(|e| e.version.clone()),
                    classification,
                    note: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Unable to fetch inventory for device {} ({}): {}",
                    member.name,
                    member.id,
                    err
                );
                DeviceStatus {
                    device_id: member.id,
                    device_name: member.name.clone(),
                    location: None,
                    installed_version: None,
                    classification: Classification::Unknown,
                    note: Some(
                        RolloutError::directory(DirectoryScope::DeviceFetch, err).to_string(),
                    ),
                }
            }
        }
    }
}

fn is_malformed(err: &crate::error::DirectoryError) -> bool {
    matches!(err, crate::error::DirectoryError::Malformed { .. })
}

/// Keep the first occurrence of each device id, preserving membership order.
fn dedup_members(members: Vec<DeviceRef>) -> Vec<DeviceRef> {
    let mut seen = HashSet::new();
    members
        .into_iter()
        .filter(|member| {
            let fresh = seen.insert(member.id);
            if !fresh {
                tracing::debug!("Skipping duplicate group member {}", member.id);
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(up_to_date: usize, outdated: usize, missing: usize, unknown: usize) -> ClassificationCounts {
        ClassificationCounts {
            up_to_date,
            outdated,
            missing,
            unknown,
        }
    }

    #[test]
    fn action_for_empty_group_is_noop() {
        assert_eq!(
            RecommendedAction::from_counts(&counts(0, 0, 0, 0)),
            RecommendedAction::NoOp
        );
    }

    #[test]
    fn action_when_all_unknown_is_noop() {
        assert_eq!(
            RecommendedAction::from_counts(&counts(0, 0, 0, 3)),
            RecommendedAction::NoOp
        );
    }

    #[test]
    fn action_progression() {
        assert_eq!(
            RecommendedAction::from_counts(&counts(0, 2, 1, 0)),
            RecommendedAction::BeginRollout
        );
        assert_eq!(
            RecommendedAction::from_counts(&counts(0, 1, 0, 1)),
            RecommendedAction::BeginRollout
        );
        assert_eq!(
            RecommendedAction::from_counts(&counts(1, 1, 1, 0)),
            RecommendedAction::ContinueRollout
        );
        assert_eq!(
            RecommendedAction::from_counts(&counts(2, 0, 0, 1)),
            RecommendedAction::ContinueRollout
        );
        assert_eq!(
            RecommendedAction::from_counts(&counts(3, 0, 0, 0)),
            RecommendedAction::RolloutComplete
        );
    }

    #[test]
    fn classify_by_entry() {
        let entry = DeviceInventoryEntry {
            app_name: "Retail App".to_string(),
            version: "2.0.0".to_string(),
            bundle_id: None,
        };
        assert_eq!(classify(Some(&entry), "2.0"), Classification::UpToDate);
        assert_eq!(classify(Some(&entry), "2.1"), Classification::Outdated);
        assert_eq!(classify(None, "2.0"), Classification::Missing);
    }

    #[test]
    fn newer_than_target_is_outdated() {
        let entry = DeviceInventoryEntry {
            app_name: "Retail App".to_string(),
            version: "2.1".to_string(),
            bundle_id: None,
        };
        assert_eq!(classify(Some(&entry), "2.0"), Classification::Outdated);
    }

    #[test]
    fn default_group_name_follows_convention() {
        assert_eq!(
            default_group_name("Retail App", "2.0"),
            "Retail App Deployment Group 2.0"
        );
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let members = vec![
            DeviceRef { id: 1, name: "a".to_string() },
            DeviceRef { id: 2, name: "b".to_string() },
            DeviceRef { id: 1, name: "a-again".to_string() },
        ];
        let deduped = dedup_members(members);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].name, "a");
    }
}
