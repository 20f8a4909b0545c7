//! Config path resolution helpers.

use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "app-rollout";
/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub fn config_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// `<config_dir>/app-rollout/config.toml` for the current user.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_path_in(&config_dir))
}
