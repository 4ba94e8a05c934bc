//! Index file duplication stage.

use crate::config::DuplicateConfig;
use crate::pipeline::{PipelineContext, PipelineError, Stage};
use crate::report::{ItemReport, StageReport};

/// Stage that copies the transformed index file to the name the host serves
/// it under (for example `index.html` -> `app.aspx`).
pub struct DuplicateStage {
    index_file: String,
    file_name: String,
}

impl DuplicateStage {
    pub fn new(index_file: &str, config: &DuplicateConfig) -> Self {
        Self {
            index_file: index_file.to_string(),
            file_name: config.file_name.clone(),
        }
    }
}

impl Stage for DuplicateStage {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
        let mut report = StageReport::new(
            self.name(),
            format!("Copying {} to {}", self.index_file, self.file_name),
        );

        let source = ctx.target_dir.join(&self.index_file);
        if !source.is_file() {
            report.push(ItemReport::skipped(
                &self.index_file,
                format!("{} not found, cannot copy to {}", self.index_file, self.file_name),
            ));
            return Ok(report);
        }

        match std::fs::copy(&source, ctx.target_dir.join(&self.file_name)) {
            Ok(_) => report.push(ItemReport::done(
                &self.file_name,
                format!("Copied {} to {}", self.index_file, self.file_name),
            )),
            Err(e) => report.push(ItemReport::failed(
                &self.file_name,
                format!("Error copying {}: {e}", self.index_file),
            )),
        }

        Ok(report)
    }
}
