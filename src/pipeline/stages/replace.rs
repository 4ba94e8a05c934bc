//! Literal text replacement stage.

use std::path::Path;

use crate::config::ReplaceConfig;
use crate::pipeline::{
    PipelineContext, PipelineError, Stage, entry_name, is_file, read_dir_sorted,
};
use crate::report::{ItemReport, StageReport};

/// Stage that rewrites a literal string in every target file whose name
/// contains the configured pattern.
///
/// The name match ignores case; the text match does not. Files are edited in
/// place without a backup.
pub struct ReplaceStage {
    /// As configured, for display
    file_pattern: String,
    /// Lowercased, for matching
    pattern_lower: String,
    search: String,
    replacement: String,
}

impl ReplaceStage {
    pub fn new(config: &ReplaceConfig) -> Self {
        Self {
            file_pattern: config.file_pattern.clone(),
            pattern_lower: config.file_pattern.to_lowercase(),
            search: config.search.clone(),
            replacement: config.replacement.clone(),
        }
    }

    /// Replace every occurrence in one file, returning how many there were.
    fn replace_in_file(&self, path: &Path) -> std::io::Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let occurrences = content.matches(self.search.as_str()).count();
        if occurrences > 0 {
            std::fs::write(path, content.replace(&self.search, &self.replacement))?;
        }
        Ok(occurrences)
    }
}

impl Stage for ReplaceStage {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
        let mut report = StageReport::new(
            self.name(),
            format!("Processing files with \"{}\" in filename", self.file_pattern),
        );

        let matching: Vec<_> = read_dir_sorted(ctx.target_dir)?
            .into_iter()
            .filter(|entry| is_file(entry))
            .filter(|entry| entry_name(entry).to_lowercase().contains(&self.pattern_lower))
            .collect();

        let mut rewritten = 0;
        for entry in &matching {
            let name = entry_name(entry);
            match self.replace_in_file(&entry.path()) {
                Ok(0) => report.push(ItemReport::skipped(name, "No occurrences found")),
                Ok(count) => {
                    tracing::debug!(%name, count, "replaced");
                    rewritten += 1;
                    report.push(ItemReport::done(
                        name,
                        format!("Replaced {count} occurrence(s)"),
                    ));
                }
                Err(e) => {
                    let message = format!("Error rewriting {name}: {e}");
                    report.push(ItemReport::failed(name, message));
                }
            }
        }

        report.set_summary(format!(
            "Rewrote {rewritten} of {} file(s) matching pattern \"{}\"",
            matching.len(),
            self.file_pattern
        ));
        Ok(report)
    }
}
