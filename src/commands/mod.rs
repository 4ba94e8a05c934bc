pub mod init;
pub mod pull;
pub mod run;

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, DEFAULT_CONFIG_FILE, DeployConfig};
use crate::paths::base_path_from_config;

/// Load the config named on the command line, with its paths resolved
/// against the config file's directory.
fn load_config(config_file: Option<&Path>) -> Result<(DeployConfig, PathBuf), ConfigError> {
    let config_path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    let config_path = if config_path.is_relative() {
        std::env::current_dir()
            .map_err(ConfigError::CwdFailure)?
            .join(&config_path)
    } else {
        config_path
    };

    let base_path = base_path_from_config(&config_path);
    let config = DeployConfig::load_from_file(&config_path)?.resolve_paths(&base_path);
    Ok((config, base_path))
}
