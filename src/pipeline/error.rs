//! Pipeline error types.

use std::path::PathBuf;

/// Errors that stop the whole run.
///
/// Failures that only affect one file are not errors; they are recorded as
/// failed items in the stage report.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },
}
