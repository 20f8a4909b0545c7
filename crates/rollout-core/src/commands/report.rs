//! Report command implementation.
//!
//! Fills in the target version and group name the way the deployment
//! workflow names things, then runs the resolver.

use crate::directory::DeviceDirectory;
use crate::error::RolloutError;
use crate::status::{
    DeploymentReport, DeploymentStatusResolver, ResolverOptions, default_group_name,
};

/// Options for the report command
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Exact app name in the catalog
    pub app_name: String,
    /// Target version; the catalog version when unset
    pub app_version: Option<String>,
    /// Device group; `"<app> Deployment Group <version>"` when unset
    pub group_name: Option<String>,
    /// Accepted for compatibility, not used for resolution
    pub minimum_os_version: Option<String>,
    /// Accepted for compatibility, only checked against the catalog
    pub bundle_identifier: Option<String>,
    /// Resolver behaviour switches
    pub resolver: ResolverOptions,
}

impl ReportOptions {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn with_minimum_os_version(mut self, version: impl Into<String>) -> Self {
        self.minimum_os_version = Some(version.into());
        self
    }

    pub fn with_bundle_identifier(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_identifier = Some(bundle_id.into());
        self
    }

    pub fn with_resolver_options(mut self, options: ResolverOptions) -> Self {
        self.resolver = options;
        self
    }
}

/// Report command orchestrator
pub struct ReportCommand<D> {
    directory: D,
}

impl<D: DeviceDirectory> ReportCommand<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Resolve deployment status for the options' app.
    pub fn execute(&self, options: &ReportOptions) -> Result<DeploymentReport, RolloutError> {
        if let Some(min_os) = &options.minimum_os_version {
            tracing::debug!("Minimum iOS version {} is not used for resolution", min_os);
        }

        let resolver = DeploymentStatusResolver::with_options(&self.directory, options.resolver);
        let app = resolver.lookup_app(&options.app_name)?;

        if let Some(bundle_id) = &options.bundle_identifier {
            if *bundle_id != app.bundle_id {
                tracing::warn!(
                    "Bundle identifier {} does not match catalog entry {} for {}",
                    bundle_id,
                    app.bundle_id,
                    app.name
                );
            } else {
                tracing::debug!("Bundle identifier {} matches catalog", bundle_id);
            }
        }

        let target_version = match &options.app_version {
            Some(version) => version.clone(),
            None => {
                tracing::info!(
                    "No target version given, using catalog version {}",
                    app.version
                );
                app.version.clone()
            }
        };

        let group_name = options
            .group_name
            .clone()
            .unwrap_or_else(|| default_group_name(&app.name, &target_version));

        let group = resolver.lookup_group(&group_name)?;
        resolver.resolve_for(app, &target_version, group)
    }
}
