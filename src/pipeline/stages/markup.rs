//! Index page transformation stage.
//!
//! Wraps [`IndexTransform`] with the file handling: read the index file from
//! the target directory, apply the edits, write it back.

use crate::config::MarkupConfig;
use crate::markup::IndexTransform;
use crate::pipeline::{PipelineContext, PipelineError, Stage};
use crate::report::{ItemReport, StageReport};

/// Stage that applies the hosting edits to the index file.
///
/// A missing index file skips the stage. Each edit is reported as its own
/// item, followed by the outcome of writing the file.
pub struct MarkupStage {
    index_file: String,
    transform: IndexTransform,
}

impl MarkupStage {
    pub fn new(config: &MarkupConfig) -> Self {
        Self {
            index_file: config.index_file.clone(),
            transform: IndexTransform::new(config),
        }
    }
}

impl Stage for MarkupStage {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
        let mut report = StageReport::new(self.name(), format!("Processing {}", self.index_file));
        let path = ctx.target_dir.join(&self.index_file);

        if !path.is_file() {
            report.push(ItemReport::skipped(
                &self.index_file,
                format!("{} not found in directory", self.index_file),
            ));
            return Ok(report);
        }

        let original = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                let message = format!("Error reading {}: {e}", self.index_file);
                report.push(ItemReport::failed(&self.index_file, message));
                return Ok(report);
            }
        };

        let transformed = self.transform.apply(&original);
        for edit in transformed.edits {
            report.push(if edit.applied {
                ItemReport::done(edit.edit, edit.message)
            } else {
                ItemReport::skipped(edit.edit, edit.message)
            });
        }

        // Unchanged content is not rewritten, so a re-run keeps the file's mtime
        if transformed.content == original {
            report.set_summary(format!("{} already up to date", self.index_file));
            return Ok(report);
        }

        match std::fs::write(&path, &transformed.content) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "index file rewritten");
                report.set_summary(format!("{} updated successfully", self.index_file));
            }
            Err(e) => {
                let message = format!("Error writing {}: {e}", self.index_file);
                report.push(ItemReport::failed(&self.index_file, message));
            }
        }

        Ok(report)
    }
}
