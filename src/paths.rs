//! Path resolution helpers.
//!
//! Paths in a config file are relative to the directory holding that file,
//! not to the working directory distprep was started from.

use std::path::{Path, PathBuf};

/// Resolve `path` against `base_path` unless it is already absolute.
pub fn resolve_against(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Lowercased extension of `name` with a leading dot, or `None` if it has none.
///
/// `"Main.JS"` -> `".js"`, `".gitignore"` -> `None`
pub fn dotted_extension(name: &Path) -> Option<String> {
    name.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Normalize configured extensions to the form returned by [`dotted_extension`].
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .collect()
}
