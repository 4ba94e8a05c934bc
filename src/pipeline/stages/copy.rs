//! Build file copying stage.

use crate::config::CopyConfig;
use crate::paths::{dotted_extension, normalize_extensions};
use crate::pipeline::{
    PipelineContext, PipelineError, Stage, entry_name, is_file, read_dir_sorted,
};
use crate::report::{ItemReport, StageReport};

/// Stage that copies top-level source files with an allowed extension into
/// the target directory, overwriting files of the same name.
///
/// Subdirectories of the source are never entered.
pub struct CopyStage {
    /// Lowercased, with a leading dot
    extensions: Vec<String>,
}

impl CopyStage {
    pub fn new(config: &CopyConfig) -> Self {
        Self {
            extensions: normalize_extensions(&config.extensions),
        }
    }

    fn is_allowed(&self, name: &str) -> bool {
        dotted_extension(std::path::Path::new(name))
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

impl Stage for CopyStage {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn run(&self, ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
        if !ctx.source_dir.is_dir() {
            return Err(PipelineError::SourceNotFound(ctx.source_dir.to_path_buf()));
        }

        let mut report = StageReport::new(self.name(), "Copying files from source to target");
        let mut copied = 0;

        for entry in read_dir_sorted(ctx.source_dir)? {
            let name = entry_name(&entry);
            if !is_file(&entry) || !self.is_allowed(&name) {
                tracing::debug!(%name, "not copied");
                continue;
            }

            let destination = ctx.target_dir.join(&name);
            match std::fs::copy(entry.path(), &destination) {
                Ok(bytes) => {
                    tracing::debug!(%name, bytes, "copied");
                    copied += 1;
                    report.push(ItemReport::done(name, "Copied"));
                }
                Err(e) => {
                    let message = format!("Error copying {name}: {e}");
                    report.push(ItemReport::failed(name, message));
                }
            }
        }

        let kinds = self
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.'))
            .collect::<Vec<_>>()
            .join(", ");
        report.set_summary(format!(
            "Copied {copied} file(s) ({kinds}) from source to target"
        ));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let root = TempDir::new().unwrap();
        let source = root.path().join("browser");
        let target = root.path().join("dist");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        (root, source, target)
    }

    fn names_in(dir: &std::path::Path) -> Vec<String> {
        read_dir_sorted(dir).unwrap().iter().map(entry_name).collect()
    }

    #[test]
    fn test_copies_only_allowed_extensions() {
        let (_root, source, target) = setup();
        fs::write(source.join("main.js"), "console.log(1);").unwrap();
        fs::write(source.join("main.css"), "body{}").unwrap();
        fs::write(source.join("readme.md"), "# readme").unwrap();
        fs::write(source.join("icon.png"), b"\x89PNG").unwrap();

        let stage = CopyStage::new(&CopyConfig::default());
        let report = stage.run(&PipelineContext::new(&source, &target)).unwrap();

        assert_eq!(names_in(&target), vec!["main.css", "main.js"]);
        assert_eq!(fs::read(target.join("main.js")).unwrap(), b"console.log(1);");
        assert_eq!(
            report.summary.as_deref(),
            Some("Copied 2 file(s) (js, html, css) from source to target")
        );
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let (_root, source, target) = setup();
        fs::write(source.join("INDEX.HTML"), "<html></html>").unwrap();

        let stage = CopyStage::new(&CopyConfig {
            extensions: vec!["html".to_string()],
        });
        stage.run(&PipelineContext::new(&source, &target)).unwrap();

        assert_eq!(names_in(&target), vec!["INDEX.HTML"]);
    }

    #[test]
    fn test_does_not_descend_into_directories() {
        let (_root, source, target) = setup();
        fs::create_dir(source.join("media.js")).unwrap();
        fs::create_dir(source.join("assets")).unwrap();
        fs::write(source.join("assets/extra.js"), "").unwrap();

        let stage = CopyStage::new(&CopyConfig::default());
        let report = stage.run(&PipelineContext::new(&source, &target)).unwrap();

        assert!(names_in(&target).is_empty());
        assert!(report.items.is_empty());
    }

    #[test]
    fn test_overwrites_existing_files() {
        let (_root, source, target) = setup();
        fs::write(source.join("main.js"), "new").unwrap();
        fs::write(target.join("main.js"), "old build output").unwrap();

        let stage = CopyStage::new(&CopyConfig::default());
        stage.run(&PipelineContext::new(&source, &target)).unwrap();

        assert_eq!(fs::read_to_string(target.join("main.js")).unwrap(), "new");
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let (root, _source, target) = setup();
        let missing = root.path().join("missing");

        let stage = CopyStage::new(&CopyConfig::default());
        let result = stage.run(&PipelineContext::new(&missing, &target));

        assert!(matches!(result, Err(PipelineError::SourceNotFound(p)) if p == missing));
    }

    #[test]
    fn test_copy_failure_is_reported_per_file() {
        let (root, source, _target) = setup();
        fs::write(source.join("main.js"), "js").unwrap();
        fs::write(source.join("styles.css"), "css").unwrap();
        let missing_target = root.path().join("no-such-dir");

        let stage = CopyStage::new(&CopyConfig::default());
        let report = stage
            .run(&PipelineContext::new(&source, &missing_target))
            .unwrap();

        assert_eq!(report.count(crate::report::ItemStatus::Failed), 2);
        assert!(report.item("main.js").unwrap().message.starts_with("Error copying main.js"));
    }
}
