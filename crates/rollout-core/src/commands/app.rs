//! App lookup command implementation.

use crate::directory::DeviceDirectory;
use crate::error::RolloutError;
use crate::status::DeploymentStatusResolver;
use crate::types::AppRecord;

/// Looks up a single catalog entry by exact name
pub struct AppLookupCommand<D> {
    directory: D,
}

impl<D: DeviceDirectory> AppLookupCommand<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn execute(&self, app_name: &str) -> Result<AppRecord, RolloutError> {
        DeploymentStatusResolver::new(&self.directory).lookup_app(app_name)
    }
}
