//! Shallow directory listing shared by the stages.

use std::fs::DirEntry;
use std::path::Path;

use super::PipelineError;

/// List the top-level entries of `dir`, sorted by file name.
///
/// Any failure while listing is fatal: a stage cannot do useful work on a
/// directory it cannot see.
pub fn read_dir_sorted(dir: &Path) -> Result<Vec<DirEntry>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::ReadEntry {
            path: dir.to_path_buf(),
            source: e,
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    Ok(entries)
}

/// The entry's file name as UTF-8 (lossy).
pub fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

/// Whether the entry is a regular file, following symlinks.
pub fn is_file(entry: &DirEntry) -> bool {
    std::fs::metadata(entry.path())
        .map(|m| m.is_file())
        .unwrap_or(false)
}
