//! High-level commands for app-rollout operations.
//!
//! These are the entry points frontends call; they own the defaulting rules
//! (target version, group naming) and delegate to the resolver.

pub mod app;
pub mod report;

pub use app::AppLookupCommand;
pub use report::{ReportCommand, ReportOptions};
