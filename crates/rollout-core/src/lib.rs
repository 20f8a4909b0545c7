//! App Rollout Core Library
//!
//! Resolves the deployment state of an iOS app across a managed device
//! group and recommends the next rollout step, with support for Jamf Pro
//! and offline directory snapshots.

pub mod commands;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod logging;
pub mod notify;
pub mod report;
pub mod status;
pub mod types;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigError, ConfigStore, JamfOverrides, JamfSettings, MailConfig, RolloutConfig,
    };
    pub use crate::context::AppContext;

    // Directory
    pub use crate::directory::{DeviceDirectory, InMemoryDirectory, JamfDirectory};
    pub use crate::types::{AppRecord, DeviceGroup, DeviceInventory, DeviceInventoryEntry, DeviceRef};

    // Resolution
    pub use crate::commands::{AppLookupCommand, ReportCommand, ReportOptions};
    pub use crate::error::{DeliveryError, DirectoryError, DirectoryScope, LookupKind, RolloutError};
    pub use crate::status::{
        Classification, ClassificationCounts, DeploymentReport, DeploymentStatusResolver,
        DeviceStatus, RecommendedAction, ResolverOptions,
    };

    // Notification
    pub use crate::logging::LogSink;
    pub use crate::notify::{Notifier, SmtpNotifier, deliver_best_effort};
}
