//! Pipeline context for sharing state across stages.

use std::path::Path;

/// The directories every stage works on.
///
/// Stage-specific settings are handed to each stage when it is constructed;
/// the context only carries what all of them share.
pub struct PipelineContext<'a> {
    /// Build output the copy stage reads from
    pub source_dir: &'a Path,

    /// Distribution directory that is cleaned, filled and rewritten
    pub target_dir: &'a Path,
}

impl<'a> PipelineContext<'a> {
    pub fn new(source_dir: &'a Path, target_dir: &'a Path) -> Self {
        Self {
            source_dir,
            target_dir,
        }
    }
}
