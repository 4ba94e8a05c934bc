//! Configuration loading and types for distprep.
//!
//! Type definitions live in `types` and file/environment loading in `load`.
//! [`DeployConfig::validate`] below checks the values the pipeline relies on.

mod load;
mod types;

use std::path::PathBuf;

use crate::markup::{has_inline_tag, title_block};

pub use load::DEFAULT_CONFIG_FILE;
pub use types::{
    CleanConfig, CopyConfig, DeployConfig, DuplicateConfig, MarkupConfig, PathRewrite,
    PullConfig, ReplaceConfig,
};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

// =============================================================================
// Validation
// =============================================================================

impl DeployConfig {
    /// Check the values the stages depend on for idempotent output.
    ///
    /// Every inserted fragment must contain the marker that is later used to
    /// detect it, otherwise a second run would insert it again.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replace.search.is_empty() {
            return Err(ConfigError::Validation(
                "'replace.search' must not be empty".to_string(),
            ));
        }

        let markup = &self.markup;
        if markup.index_file.is_empty() {
            return Err(ConfigError::Validation(
                "'markup.index_file' must not be empty".to_string(),
            ));
        }
        if markup.directive_prefix.is_empty()
            || !markup.directive.starts_with(&markup.directive_prefix)
        {
            return Err(ConfigError::Validation(format!(
                "'markup.directive' must start with 'markup.directive_prefix' ({:?})",
                markup.directive_prefix
            )));
        }
        if markup.style_marker.is_empty() || !markup.style_block.contains(&markup.style_marker) {
            return Err(ConfigError::Validation(
                "'markup.style_block' must contain 'markup.style_marker'".to_string(),
            ));
        }
        if markup.body_marker.is_empty() || !markup.body_markup.contains(&markup.body_marker) {
            return Err(ConfigError::Validation(
                "'markup.body_markup' must contain 'markup.body_marker'".to_string(),
            ));
        }
        // Inserted text lands after the line-break edits have run
        for (key, fragment) in [
            ("markup.directive", markup.directive.clone()),
            ("markup.title", title_block(&markup.title, &markup.base_href)),
            ("markup.style_block", markup.style_block.clone()),
            ("markup.body_markup", markup.body_markup.clone()),
        ] {
            if has_inline_tag(&fragment) {
                return Err(ConfigError::Validation(format!(
                    "'{key}' has a <link> or <script> tag that does not start a line"
                )));
            }
        }
        if markup.asset_base_url.is_empty() {
            return Err(ConfigError::Validation(
                "'markup.asset_base_url' must not be empty".to_string(),
            ));
        }
        if let Some(rewrite) = markup
            .rewrites
            .iter()
            .find(|r| r.attribute.is_empty() || r.prefix.is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "path rewrite {:?} needs both an attribute and a prefix",
                rewrite
            )));
        }
        // A rewritten reference, or the inserted <base href>, must not match
        // a rewrite again on the next run
        if let Some(rewrite) = markup.rewrites.iter().find(|r| {
            markup.asset_base_url.starts_with(&r.prefix)
                || (r.attribute == "href" && markup.base_href.starts_with(&r.prefix))
        }) {
            return Err(ConfigError::Validation(format!(
                "path rewrite prefix '{}' overlaps 'markup.asset_base_url' or 'markup.base_href'",
                rewrite.prefix
            )));
        }

        if self.duplicate.file_name.is_empty() || self.duplicate.file_name == markup.index_file {
            return Err(ConfigError::Validation(format!(
                "'duplicate.file_name' must be a file name other than '{}'",
                markup.index_file
            )));
        }

        if let Some(pull) = &self.pull
            && pull.retry_delays_secs.is_empty()
        {
            return Err(ConfigError::Validation(
                "'pull.retry_delays_secs' needs at least one entry".to_string(),
            ));
        }

        Ok(())
    }
}
