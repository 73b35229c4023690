//! Run summaries for install, uninstall, and update flows.
//!
//! Counters are accumulated by the orchestrator and returned to the caller;
//! there is no shared mutable state between components.

use serde::Serialize;
use std::path::PathBuf;

use crate::executor::{ExecutionResult, ExecutionStatus};
use skillsync_discovery::SyncItem;

/// Per-item record kept for verbose reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRecord {
    /// Item kind label (`skill`, `agent`, ...).
    pub kind: String,
    /// Item display name.
    pub name: String,
    /// Destination path the outcome applies to.
    pub dest_path: PathBuf,
    /// Final status of the item.
    pub status: ExecutionStatus,
    /// Optional detail (error text, backup location).
    pub message: Option<String>,
}

/// Outcome counters for one install run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Items newly created at the destination.
    pub created: usize,
    /// Items replaced or relinked to match source.
    pub updated: usize,
    /// Items already matching source.
    pub unchanged: usize,
    /// Divergent items preserved as repo-specific customizations.
    pub repo_specific: usize,
    /// Items that failed; any value above zero makes the run exit non-zero.
    pub errored: usize,
    /// Whether this was a dry run (no filesystem mutation).
    pub dry_run: bool,
    /// Per-item outcomes, in processing order.
    pub items: Vec<ItemRecord>,
}

impl RunSummary {
    /// Creates an empty summary for a run.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Records one item's execution result.
    pub fn record(&mut self, item: &SyncItem, result: &ExecutionResult) {
        match result.status {
            ExecutionStatus::Created => self.created += 1,
            ExecutionStatus::Updated => self.updated += 1,
            ExecutionStatus::SkippedUnchanged => self.unchanged += 1,
            ExecutionStatus::SkippedRepoSpecific => self.repo_specific += 1,
            ExecutionStatus::Errored => self.errored += 1,
        }
        self.items.push(ItemRecord {
            kind: item.kind.label().to_string(),
            name: item.name.clone(),
            dest_path: item.dest_path.clone(),
            status: result.status,
            message: result.message.clone(),
        });
    }

    /// Returns true when any item errored.
    pub fn has_errors(&self) -> bool {
        self.errored > 0
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self, verbose: bool) -> String {
        let mut out = String::new();
        if self.dry_run {
            out.push_str("Dry run (no changes written)\n");
        }
        out.push_str(&format!("  Created:       {}\n", self.created));
        out.push_str(&format!("  Updated:       {}\n", self.updated));
        out.push_str(&format!("  Unchanged:     {}\n", self.unchanged));
        out.push_str(&format!("  Repo-specific: {}\n", self.repo_specific));
        out.push_str(&format!("  Errored:       {}\n", self.errored));
        if verbose {
            for record in &self.items {
                let detail = record
                    .message
                    .as_deref()
                    .map(|m| format!(" ({m})"))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  [{:?}] {} {}{}\n",
                    record.status,
                    record.kind,
                    record.dest_path.display(),
                    detail
                ));
            }
        }
        out
    }
}

/// Outcome counters for one uninstall run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UninstallSummary {
    /// Manifest paths that existed and were removed.
    pub removed: usize,
    /// Manifest paths already absent (user deleted manually; not an error).
    pub missing: usize,
    /// Manifest lines that could not be interpreted and were skipped.
    pub corrupt_lines: usize,
    /// Paths whose removal failed (permissions etc.); run continues.
    pub errored: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Paths removed (or that would be removed), in manifest order.
    pub removed_paths: Vec<PathBuf>,
}

impl UninstallSummary {
    /// Generates a formatted summary for display.
    pub fn format_summary(&self, verbose: bool) -> String {
        let mut out = String::new();
        if self.dry_run {
            out.push_str("Dry run (no changes written)\n");
        }
        out.push_str(&format!("  Removed: {}\n", self.removed));
        out.push_str(&format!("  Missing: {}\n", self.missing));
        if self.corrupt_lines > 0 {
            out.push_str(&format!("  Skipped manifest lines: {}\n", self.corrupt_lines));
        }
        if self.errored > 0 {
            out.push_str(&format!("  Errored: {}\n", self.errored));
        }
        if verbose {
            for path in &self.removed_paths {
                out.push_str(&format!("  removed {}\n", path.display()));
            }
        }
        out
    }
}
