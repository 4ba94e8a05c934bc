//! Target directory cleaning stage.

use crate::config::CleanConfig;
use crate::pipeline::{PipelineContext, PipelineError, Stage, entry_name, read_dir_sorted};
use crate::report::{ItemReport, StageReport};

/// Stage that removes every top-level entry of the target directory that is
/// not on the preserve-list.
///
/// Files and symlinks are unlinked, directories are removed recursively.
/// Failing to delete one entry is reported and the stage moves on; failing
/// to list the directory aborts the run.
pub struct CleanStage {
    preserve: Vec<String>,
}

impl CleanStage {
    pub fn new(config: &CleanConfig) -> Self {
        Self {
            preserve: config.preserve.clone(),
        }
    }

    fn is_preserved(&self, name: &str) -> bool {
        self.preserve.iter().any(|p| p == name)
    }
}

impl Stage for CleanStage {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
        let mut report = StageReport::new(self.name(), "Clearing target directory");
        let mut deleted = 0;

        for entry in read_dir_sorted(ctx.target_dir)? {
            let name = entry_name(&entry);
            if self.is_preserved(&name) {
                report.push(ItemReport::skipped(name, "Preserving"));
                continue;
            }

            let path = entry.path();
            // file_type() does not follow symlinks, so a link to a directory
            // is unlinked rather than emptied
            let result = entry.file_type().and_then(|file_type| {
                if file_type.is_dir() {
                    std::fs::remove_dir_all(&path).map(|()| "Deleted directory")
                } else {
                    std::fs::remove_file(&path).map(|()| "Deleted file")
                }
            });

            match result {
                Ok(message) => {
                    tracing::debug!(path = %path.display(), "deleted");
                    deleted += 1;
                    report.push(ItemReport::done(name, message));
                }
                Err(e) => {
                    let message = format!("Error deleting {name}: {e}");
                    report.push(ItemReport::failed(name, message));
                }
            }
        }

        report.set_summary(format!("Cleared {deleted} item(s) from directory"));
        Ok(report)
    }
}
