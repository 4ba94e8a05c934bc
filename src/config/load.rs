//! Configuration loading from files.
//!
//! This module handles reading and parsing configuration files. Values from
//! the file can be overridden with `DISTPREP_`-prefixed environment variables,
//! using `__` to reach nested keys (`DISTPREP_REPLACE__SEARCH`).

use std::path::Path;

use super::{ConfigError, DeployConfig};
use crate::paths::resolve_against;

/// File name used when no config file is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "distprep.yaml";

const ENV_PREFIX: &str = "DISTPREP";

impl DeployConfig {
    /// Load and validate the config from a file path.
    ///
    /// Paths in the returned config are still as written; use
    /// [`DeployConfig::resolve_paths`] to anchor them.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<DeployConfig>()?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a config from YAML text, without environment overrides.
    #[cfg(test)]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize::<DeployConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve every relative path against `base_path` (the config file's directory).
    pub fn resolve_paths(mut self, base_path: &Path) -> Self {
        self.source = resolve_against(base_path, &self.source);
        self.target = resolve_against(base_path, &self.target);
        if let Some(pull) = self.pull.as_mut() {
            pull.output = resolve_against(base_path, &pull.output);
        }
        self
    }
}
