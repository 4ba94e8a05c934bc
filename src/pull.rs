//! Pull the published distribution back out of its git repository.
//!
//! The output directory is wiped, the repository is fetched into the cache,
//! and the deployable top-level files are copied over. A file that cannot be
//! copied is replaced by an empty placeholder so the set of names stays
//! complete.

use std::path::{Path, PathBuf};

use crate::config::PullConfig;
use crate::git::{GitError, GitFetcher, RepoLocation};
use crate::paths::{dotted_extension, normalize_extensions};
use crate::pipeline::{PipelineError, entry_name, is_file, read_dir_sorted};
use crate::report::{ItemReport, StageReport};

#[derive(thiserror::Error, Debug)]
pub enum PullError {
    #[error("failed to clear output directory {path}: {source}")]
    ClearOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Listing(#[from] PipelineError),
}

/// Pull the files selected by `config` into `config.output`.
pub fn pull(config: &PullConfig, fetcher: &GitFetcher) -> Result<StageReport, PullError> {
    let mut report = StageReport::new(
        "pull",
        format!("Pulling published files from {}", config.repository),
    );

    reset_dir(&config.output)?;

    let location = RepoLocation {
        url: config.repository.clone(),
        git_ref: config.git_ref.clone(),
    };
    let checkout = fetcher.fetch_with_retry(&location, &config.retry_delays_secs)?;

    let extensions = normalize_extensions(&config.extensions);
    let mut pulled = 0;

    for entry in read_dir_sorted(&checkout)? {
        let name = entry_name(&entry);
        if !is_file(&entry) {
            continue;
        }
        if config.exclude.iter().any(|e| *e == name) {
            report.push(ItemReport::skipped(name, "Excluded"));
            continue;
        }
        let allowed = dotted_extension(Path::new(&name)).is_some_and(|ext| extensions.contains(&ext));
        if !allowed {
            continue;
        }

        let destination = config.output.join(&name);
        match std::fs::copy(entry.path(), &destination) {
            Ok(_) => {
                pulled += 1;
                report.push(ItemReport::done(name, format!("Saved to {}", destination.display())));
            }
            Err(e) => {
                let message = match std::fs::write(&destination, b"") {
                    Ok(()) => format!("Error copying {name}: {e}; created empty file"),
                    Err(placeholder) => format!(
                        "Error copying {name}: {e}; could not create empty file: {placeholder}"
                    ),
                };
                report.push(ItemReport::failed(name, message));
            }
        }
    }

    report.set_summary(format!(
        "Pulled {pulled} file(s) into {}",
        config.output.display()
    ));
    Ok(report)
}

/// Remove `dir` if it exists and create it empty.
fn reset_dir(dir: &Path) -> Result<(), PullError> {
    let clear_failed = |e| PullError::ClearOutput {
        path: dir.to_path_buf(),
        source: e,
    };

    if dir.exists() {
        tracing::info!("Clearing {}...", dir.display());
        std::fs::remove_dir_all(dir).map_err(clear_failed)?;
    }
    std::fs::create_dir_all(dir).map_err(clear_failed)?;
    Ok(())
}
