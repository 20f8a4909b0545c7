use tempfile::TempDir;

use rollout_core::commands::{ReportCommand, ReportOptions};
use rollout_core::config::{JamfOverrides, RolloutConfig};
use rollout_core::context::AppContext;
use rollout_core::directory::{DeviceDirectory, InMemoryDirectory};
use rollout_core::error::{DirectoryError, DirectoryScope, RolloutError};
use rollout_core::status::{Classification, RecommendedAction};

const SNAPSHOT: &str = r#"{
  "apps": [
    { "id": 12, "name": "Retail App", "version": "2.0", "bundle_id": "com.example.retail" }
  ],
  "groups": [
    {
      "id": 56,
      "name": "Retail App Deployment Group 2.0",
      "is_smart": true,
      "members": [ { "id": 1, "name": "iPad-1" }, { "id": 2, "name": "iPad-2" } ]
    }
  ],
  "devices": [
    {
      "device_id": 1,
      "device_name": "iPad-1",
      "entries": [ { "app_name": "Retail App", "version": "1.9" } ]
    }
  ],
  "failing_devices": [2]
}"#;

fn write_snapshot(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("snapshot.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    path
}

#[test]
fn snapshot_file_loads_into_directory() {
    let temp = TempDir::new().unwrap();
    let path = write_snapshot(&temp);

    let directory = InMemoryDirectory::from_snapshot_file(&path).unwrap();

    assert_eq!(directory.list_apps().unwrap().len(), 1);
    assert_eq!(directory.fetch_group_members(56).unwrap().len(), 2);
    assert!(matches!(
        directory.fetch_device_inventory(2),
        Err(DirectoryError::Transport { .. })
    ));
}

#[test]
fn invalid_snapshot_is_a_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("snapshot.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = InMemoryDirectory::from_snapshot_file(&path).unwrap_err();

    assert!(matches!(err, DirectoryError::Snapshot(_)));
}

#[test]
fn context_resolves_against_snapshot_without_jamf_settings() {
    let temp = TempDir::new().unwrap();
    let path = write_snapshot(&temp);
    let ctx = AppContext::with_config(RolloutConfig::default(), JamfOverrides::default());

    let directory = ctx.directory(Some(&path)).unwrap();
    let report = ReportCommand::new(directory)
        .execute(&ReportOptions::new("Retail App"))
        .unwrap();

    assert_eq!(report.devices()[0].classification, Classification::Outdated);
    assert_eq!(report.devices()[1].classification, Classification::Unknown);
    assert_eq!(report.action(), RecommendedAction::BeginRollout);
}

#[test]
fn context_maps_missing_snapshot_to_listing_error() {
    let temp = TempDir::new().unwrap();
    let ctx = AppContext::with_config(RolloutConfig::default(), JamfOverrides::default());

    let err = ctx
        .directory(Some(&temp.path().join("absent.json")))
        .err()
        .unwrap();

    assert!(matches!(
        err.downcast_ref::<RolloutError>(),
        Some(RolloutError::Directory {
            scope: DirectoryScope::Listing,
            ..
        })
    ));
}
