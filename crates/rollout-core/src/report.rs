//! Plain-text and JSON renderings of a [`DeploymentReport`].

use anyhow::Context;
use serde::Serialize;

use crate::status::{
    Classification, ClassificationCounts, DeploymentReport, DeviceStatus, RecommendedAction,
};

/// Version of the JSON output layout.
pub const JSON_SCHEMA_VERSION: u32 = 1;

pub fn classification_label(classification: Classification) -> &'static str {
    match classification {
        Classification::UpToDate => "Up-to-date",
        Classification::Outdated => "Outdated",
        Classification::Missing => "Missing",
        Classification::Unknown => "Unknown",
    }
}

pub fn action_label(action: RecommendedAction) -> &'static str {
    match action {
        RecommendedAction::NoOp => "No action",
        RecommendedAction::BeginRollout => "Begin rollout",
        RecommendedAction::ContinueRollout => "Continue rollout",
        RecommendedAction::RolloutComplete => "Rollout complete",
    }
}

/// Render the report as a fixed-width text table.
pub fn render_text(report: &DeploymentReport) -> String {
    let mut out = header_lines(report);
    out.push('\n');

    if report.devices().is_empty() {
        out.push_str("No devices in group.\n");
    } else {
        out.push_str(&table_header());
        out.push('\n');
        for device in report.devices() {
            out.push_str(&device_columns(device));
            out.push_str(&status_text(device));
            out.push('\n');
        }
    }

    out.push('\n');
    out.push_str(&summary_line(report.counts()));
    out.push('\n');
    out.push_str(&format!("Recommended action: {}\n", action_label(report.action())));
    out
}

/// App, target, group and timestamp lines, each newline-terminated.
pub fn header_lines(report: &DeploymentReport) -> String {
    let app = report.app();
    format!(
        "App: {} (bundle {}, catalog version {})\nTarget version: {}\nGroup: {} (id {})\nGenerated: {}\n",
        app.name,
        display_or_dash(&app.bundle_id),
        display_or_dash(&app.version),
        report.target_version(),
        report.group().name,
        report.group().id,
        report.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Column titles and rule of the device table.
pub fn table_header() -> String {
    format!(
        "  {:<24} {:<24} {:<12} Status\n  {}",
        "Device",
        "Location",
        "Installed",
        "-".repeat(72)
    )
}

/// Padded device, location and installed-version columns of a table row.
///
/// Ends with the separator before the status column, so callers append
/// [`status_text`] (styled or not).
pub fn device_columns(device: &DeviceStatus) -> String {
    format!(
        "  {:<24} {:<24} {:<12} ",
        truncate(&device.device_name, 24),
        truncate(device.location.as_deref().unwrap_or("-"), 24),
        truncate(device.installed_version.as_deref().unwrap_or("-"), 12),
    )
}

/// Classification label plus any error note.
pub fn status_text(device: &DeviceStatus) -> String {
    let label = classification_label(device.classification);
    match &device.note {
        Some(note) => format!("{label} ({note})"),
        None => label.to_string(),
    }
}

pub fn summary_line(counts: &ClassificationCounts) -> String {
    format!(
        "Summary: {} devices, {} up-to-date, {} outdated, {} missing, {} unknown",
        counts.total(),
        counts.up_to_date,
        counts.outdated,
        counts.missing,
        counts.unknown
    )
}

/// Render the report as versioned JSON.
pub fn render_json(report: &DeploymentReport) -> serde_json::Result<String> {
    let output = serde_json::json!({
        "schema_version": JSON_SCHEMA_VERSION,
        "app": report.app(),
        "target_version": report.target_version(),
        "group": report.group(),
        "counts": report.counts(),
        "devices": report.devices(),
        "action": report.action(),
        "generated_at": report.generated_at(),
    });
    serde_json::to_string_pretty(&output)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    device_id: u64,
    device_name: &'a str,
    location: Option<&'a str>,
    installed_version: Option<&'a str>,
    status: &'static str,
    note: Option<&'a str>,
}

/// Render one spreadsheet row per device, with a header row.
pub fn render_csv(report: &DeploymentReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if report.devices().is_empty() {
        writer.write_record(CSV_HEADER)?;
    }
    for device in report.devices() {
        writer.serialize(CsvRow {
            device_id: device.device_id,
            device_name: &device.device_name,
            location: device.location.as_deref(),
            installed_version: device.installed_version.as_deref(),
            status: classification_label(device.classification),
            note: device.note.as_deref(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

const CSV_HEADER: [&str; 6] = [
    "device_id",
    "device_name",
    "location",
    "installed_version",
    "status",
    "note",
];

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
