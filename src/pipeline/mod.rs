//! Post-processing pipeline for a build output directory.
//!
//! The pipeline runs a fixed series of stages against the target directory:
//! 1. Clean (empty the target except for preserved entries)
//! 2. Copy (bring in build files with allowed extensions)
//! 3. Replace (literal text substitution in matching files)
//! 4. Markup (idempotent edits to the index file)
//! 5. Duplicate (copy the index file to its hosted name)
//!
//! Each stage runs to completion before the next starts. A stage returns
//! `Err` only for fatal problems; per-item failures end up in its report.

mod context;
mod error;
mod listing;
mod stages;

pub use context::PipelineContext;
pub use error::PipelineError;
pub(crate) use listing::{entry_name, is_file, read_dir_sorted};

use stages::{CleanStage, CopyStage, DuplicateStage, MarkupStage, ReplaceStage};

use crate::config::DeployConfig;
use crate::report::{RunReport, StageReport};

/// A stage in the post-processing pipeline.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Run this stage against the directories in `ctx`.
    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError>;
}

/// The post-processing pipeline.
///
/// The default pipeline includes: clean → copy → replace → markup → duplicate.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create the standard pipeline, configuring each stage from `config`.
    pub fn from_config(config: &DeployConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(CleanStage::new(&config.clean));
        pipeline.add_stage(CopyStage::new(&config.copy));
        pipeline.add_stage(ReplaceStage::new(&config.replace));
        pipeline.add_stage(MarkupStage::new(&config.markup));
        pipeline.add_stage(DuplicateStage::new(
            &config.markup.index_file,
            &config.duplicate,
        ));
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every stage in order.
    ///
    /// `on_stage` sees each report as soon as its stage finishes, so progress
    /// up to a fatal error can still be shown.
    pub fn run(
        &self,
        ctx: &PipelineContext,
        mut on_stage: impl FnMut(&StageReport),
    ) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for stage in &self.stages {
            let _span = tracing::info_span!("stage", name = stage.name()).entered();
            let stage_report = stage.run(ctx)?;
            tracing::debug!(items = stage_report.items.len(), "stage finished");
            on_stage(&stage_report);
            report.stages.push(stage_report);
        }

        Ok(report)
    }

    /// Get the names of all stages in order.
    #[allow(dead_code)]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&DeployConfig::default())
    }
}
