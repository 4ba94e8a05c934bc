//! Console presentation of run reports.

use std::fmt::Write;

use crate::report::{ItemStatus, RunReport, StageReport};

/// Marker printed in front of an item.
pub fn marker(status: ItemStatus) -> char {
    match status {
        ItemStatus::Done => '✓',
        ItemStatus::Skipped => '○',
        ItemStatus::Failed => '✗',
    }
}

/// Render one stage as a banner, one line per item, and its summary.
pub fn render_stage(report: &StageReport) -> String {
    let mut out = format!("=== {} ===\n\n", report.title);

    for item in &report.items {
        let _ = writeln!(
            out,
            "{} {}: {}",
            marker(item.status),
            item.subject,
            item.message
        );
    }

    if let Some(summary) = &report.summary {
        if !report.items.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{summary}");
    }

    out
}

/// Closing line for a finished run.
pub fn render_footer(report: &RunReport) -> String {
    match report.failures() {
        0 => "=== All operations complete! ===".to_string(),
        n => format!("=== All operations complete, {n} item(s) failed ==="),
    }
}

pub fn print_stage(report: &StageReport) {
    println!("{}", render_stage(report));
}

pub fn print_footer(report: &RunReport) {
    println!("{}", render_footer(report));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::report::ItemReport;

    #[test]
    fn test_render_stage() {
        let mut report = StageReport::new("clean", "Clearing target directory");
        report.push(ItemReport::skipped(".git", "Preserving"));
        report.push(ItemReport::done("old.txt", "Deleted file"));
        report.push(ItemReport::failed("locked", "Error deleting locked: permission denied"));
        report.set_summary("Cleared 1 item(s) from directory");

        assert_eq!(
            render_stage(&report),
            "=== Clearing target directory ===\n\
             \n\
             ○ .git: Preserving\n\
             ✓ old.txt: Deleted file\n\
             ✗ locked: Error deleting locked: permission denied\n\
             \n\
             Cleared 1 item(s) from directory\n"
        );
    }

    #[test]
    fn test_render_stage_without_items() {
        let mut report = StageReport::new("copy", "Copying files from source to target");
        report.set_summary("Copied 0 file(s) (js) from source to target");

        assert_eq!(
            render_stage(&report),
            "=== Copying files from source to target ===\n\nCopied 0 file(s) (js) from source to target\n"
        );
    }

    #[test]
    fn test_render_footer() {
        let mut stage = StageReport::new("copy", "Copying");
        assert_eq!(
            render_footer(&RunReport {
                stages: vec![stage.clone()],
                ..Default::default()
            }),
            "=== All operations complete! ==="
        );

        stage.push(ItemReport::failed("main.js", "disk full"));
        assert_eq!(
            render_footer(&RunReport {
                stages: vec![stage],
                ..Default::default()
            }),
            "=== All operations complete, 1 item(s) failed ==="
        );
    }
}
