//! Outcome records produced by the pipeline.
//!
//! Stages never print. They describe what happened to each item, and the
//! console (or `--json`) decides how to show it.

use serde::Serialize;

/// What happened to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The item was changed (deleted, copied, rewritten, ...)
    Done,
    /// Nothing needed doing, or the item was deliberately left alone
    Skipped,
    /// The operation on this item failed; the stage carried on
    Failed,
}

/// The outcome for one file, directory, or edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// File name or edit name the outcome is about
    pub subject: String,
    pub status: ItemStatus,
    /// Human-readable description, including the error for failures
    pub message: String,
}

impl ItemReport {
    pub fn done(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ItemStatus::Done, message)
    }

    pub fn skipped(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ItemStatus::Skipped, message)
    }

    pub fn failed(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ItemStatus::Failed, message)
    }

    fn new(subject: impl Into<String>, status: ItemStatus, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status,
            message: message.into(),
        }
    }
}

/// Everything one stage did, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Stable stage identifier (`clean`, `copy`, ...)
    pub stage: &'static str,
    /// Section banner shown above the items
    pub title: String,
    pub items: Vec<ItemReport>,
    /// Closing line, usually a count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl StageReport {
    pub fn new(stage: &'static str, title: impl Into<String>) -> Self {
        Self {
            stage,
            title: title.into(),
            items: Vec::new(),
            summary: None,
        }
    }

    pub fn push(&mut self, item: ItemReport) {
        if item.status == ItemStatus::Failed {
            tracing::warn!(stage = self.stage, subject = %item.subject, "{}", item.message);
        }
        self.items.push(item);
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    /// Look up the outcome for a subject (first match).
    #[cfg(test)]
    pub fn item(&self, subject: &str) -> Option<&ItemReport> {
        self.items.iter().find(|i| i.subject == subject)
    }
}

/// The reports of every stage that ran, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    /// The fatal error that stopped the run early, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Total number of failed items across all stages.
    pub fn failures(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.count(ItemStatus::Failed))
            .sum()
    }

    #[cfg(test)]
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}
