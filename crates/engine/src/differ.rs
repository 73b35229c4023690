//! Upstream tree diffing: classify content units as new, updated, or
//! unchanged against a freshly fetched upstream snapshot, then apply by
//! whole-unit replacement.
//!
//! Upstream content is authoritative. Local edits to synced content are
//! expected to be lost on update; custom content belongs in separate
//! directories this differ never touches.

use crate::error::EngineError;
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use skillsync_discovery::{contents_identical, tree_hashes};

/// Cap on rendered diff output per entry.
const MAX_DIFF_LINES: usize = 40;

/// Classification of one upstream unit against the local tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffClass {
    /// Absent locally.
    New,
    /// Present locally but differing from upstream.
    Updated,
    /// Byte-for-byte identical.
    Unchanged,
}

/// One comparable unit (file, or whole directory treated as a unit).
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamDiffEntry {
    /// Path of the unit relative to both roots.
    pub relative_path: PathBuf,
    /// How the unit compares.
    pub classification: DiffClass,
    /// Absolute path in the upstream snapshot.
    pub source_path: PathBuf,
    /// Absolute path in the local tree (may not exist yet when `New`).
    pub dest_path: PathBuf,
    /// Whether the unit is a directory.
    pub is_directory: bool,
}

/// Parameters for one update run.
#[derive(Debug, Clone)]
pub struct UpdateParams {
    /// Root of the fetched upstream snapshot.
    pub source_root: PathBuf,
    /// Root of the local tree to update.
    pub dest_root: PathBuf,
    /// Report without mutating the filesystem.
    pub dry_run: bool,
    /// Render a bounded unified diff for each new/updated unit.
    pub show_diff: bool,
}

/// Per-unit record of an update run.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecord {
    /// Path of the unit relative to both roots.
    pub relative_path: PathBuf,
    /// How the unit compared before applying.
    pub classification: DiffClass,
    /// Rendered diff, when requested and the unit changed.
    pub diff: Option<String>,
    /// Error text when applying this unit failed.
    pub error: Option<String>,
}

/// Outcome counters for one update run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSummary {
    /// Units absent locally before this run.
    pub new: usize,
    /// Units that differed from upstream.
    pub updated: usize,
    /// Units already matching upstream.
    pub unchanged: usize,
    /// Units actually replaced (zero on dry runs).
    pub applied: usize,
    /// Units whose replacement failed.
    pub errored: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Per-unit records, in walk order.
    pub records: Vec<UpdateRecord>,
}

impl UpdateSummary {
    /// Returns true when any unit changed relative to upstream.
    pub fn has_changes(&self) -> bool {
        self.new + self.updated > 0
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        if self.dry_run {
            out.push_str("Dry run (no changes written)\n");
        }
        out.push_str(&format!("  New:       {}\n", self.new));
        out.push_str(&format!("  Updated:   {}\n", self.updated));
        out.push_str(&format!("  Unchanged: {}\n", self.unchanged));
        out.push_str(&format!("  Applied:   {}\n", self.applied));
        if self.errored > 0 {
            out.push_str(&format!("  Errored:   {}\n", self.errored));
        }
        out
    }
}

/// Collects the comparable units of a tree, in stable lexical order.
///
/// Top-level directories are whole units, except `skills/`, where each
/// directory holding a `SKILL.md` is its own unit. Top-level files are file
/// units. Hidden entries are skipped.
fn collect_units(root: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let mut units = Vec::new();
    let mut top: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        top.push(entry.path());
    }
    top.sort();

    for path in top {
        let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if path.is_dir() && rel == Path::new("skills") {
            for entry in WalkDir::new(&path)
                .min_depth(1)
                .max_depth(8)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && entry.file_name() == "SKILL.md" {
                    if let Some(skill_dir) = entry.path().parent() {
                        let rel = skill_dir.strip_prefix(root).unwrap_or(skill_dir);
                        units.push((rel.to_path_buf(), true));
                    }
                }
            }
        } else {
            units.push((rel, path.is_dir()));
        }
    }
    Ok(units)
}

/// Diffs two trees, classifying each upstream unit against the local tree.
pub fn diff_trees(source_root: &Path, dest_root: &Path) -> Result<Vec<UpstreamDiffEntry>> {
    let mut entries = Vec::new();
    for (rel, is_directory) in collect_units(source_root)? {
        let source_path = source_root.join(&rel);
        let dest_path = dest_root.join(&rel);
        let classification = if !dest_path.exists() {
            DiffClass::New
        } else if contents_identical(&source_path, &dest_path)? {
            DiffClass::Unchanged
        } else {
            DiffClass::Updated
        };
        entries.push(UpstreamDiffEntry {
            relative_path: rel,
            classification,
            source_path,
            dest_path,
            is_directory,
        });
    }
    Ok(entries)
}

/// Renders a bounded textual diff for a new or updated entry.
///
/// Files get a unified diff; directory units get a changed-file listing.
pub fn render_entry_diff(entry: &UpstreamDiffEntry) -> Result<String> {
    if entry.is_directory {
        render_dir_diff(entry)
    } else {
        render_file_diff(entry)
    }
}

fn read_lossy(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

fn truncate_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= MAX_DIFF_LINES {
        return text.to_string();
    }
    let mut out = lines[..MAX_DIFF_LINES].join("\n");
    out.push_str(&format!(
        "\n... ({} more lines)",
        lines.len() - MAX_DIFF_LINES
    ));
    out
}

fn render_file_diff(entry: &UpstreamDiffEntry) -> Result<String> {
    let local = read_lossy(&entry.dest_path);
    let upstream = read_lossy(&entry.source_path);
    let diff = similar::TextDiff::from_lines(&local, &upstream);
    let rendered = diff
        .unified_diff()
        .context_radius(3)
        .header("local", "upstream")
        .to_string();
    Ok(truncate_lines(&rendered))
}

fn render_dir_diff(entry: &UpstreamDiffEntry) -> Result<String> {
    let upstream = tree_hashes(&entry.source_path)?;
    let local = if entry.dest_path.is_dir() {
        tree_hashes(&entry.dest_path)?
    } else {
        Default::default()
    };

    let mut lines = Vec::new();
    for (rel, hash) in &upstream {
        match local.get(rel) {
            None => lines.push(format!("+ {}", rel.display())),
            Some(existing) if existing != hash => lines.push(format!("~ {}", rel.display())),
            Some(_) => {}
        }
    }
    for rel in local.keys() {
        if !upstream.contains_key(rel) {
            lines.push(format!("- {}", rel.display()));
        }
    }
    Ok(truncate_lines(&lines.join("\n")))
}

/// Replaces the local unit wholesale with the upstream version.
pub fn apply_entry(entry: &UpstreamDiffEntry) -> Result<(), EngineError> {
    if let Some(parent) = entry.dest_path.parent() {
        fs::create_dir_all(parent).map_err(|e| EngineError::fs("create parent", parent, e))?;
    }
    // Remove whatever is there; no partial merge.
    match fs::symlink_metadata(&entry.dest_path) {
        Ok(meta) => {
            let removal = if meta.is_dir() {
                fs::remove_dir_all(&entry.dest_path)
            } else {
                fs::remove_file(&entry.dest_path)
            };
            removal.map_err(|e| EngineError::fs("remove", &entry.dest_path, e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(EngineError::fs("inspect", &entry.dest_path, e)),
    }
    if entry.is_directory {
        copy_tree(&entry.source_path, &entry.dest_path)
    } else {
        fs::copy(&entry.source_path, &entry.dest_path)
            .map(|_| ())
            .map_err(|e| EngineError::fs("copy", &entry.dest_path, e))
    }
}

fn copy_tree(src: &Path, dest: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dest).map_err(|e| EngineError::fs("create dir", dest, e))?;
    let entries = fs::read_dir(src).map_err(|e| EngineError::fs("read dir", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::fs("read dir", src, e))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        if src_path.is_dir() {
            copy_tree(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)
                .map(|_| ())
                .map_err(|e| EngineError::fs("copy", &dest_path, e))?;
        }
    }
    Ok(())
}

/// Runs a full update: diff the local tree against an upstream snapshot and
/// replace every new/updated unit. Per-unit failures are counted and the
/// run continues.
pub fn update(params: &UpdateParams) -> Result<UpdateSummary> {
    if !params.source_root.is_dir() {
        return Err(EngineError::Config {
            message: format!(
                "upstream snapshot not found: {}",
                params.source_root.display()
            ),
        }
        .into());
    }

    let mut summary = UpdateSummary {
        dry_run: params.dry_run,
        ..Default::default()
    };

    for entry in diff_trees(&params.source_root, &params.dest_root)? {
        let mut record = UpdateRecord {
            relative_path: entry.relative_path.clone(),
            classification: entry.classification,
            diff: None,
            error: None,
        };
        match entry.classification {
            DiffClass::Unchanged => summary.unchanged += 1,
            DiffClass::New | DiffClass::Updated => {
                if entry.classification == DiffClass::New {
                    summary.new += 1;
                } else {
                    summary.updated += 1;
                }
                if params.show_diff {
                    record.diff = Some(render_entry_diff(&entry)?);
                }
                if !params.dry_run {
                    match apply_entry(&entry) {
                        Ok(()) => summary.applied += 1,
                        Err(err) => {
                            tracing::warn!(
                                path = %entry.dest_path.display(),
                                error = %err,
                                "Failed to apply upstream unit"
                            );
                            summary.errored += 1;
                            record.error = Some(err.to_string());
                        }
                    }
                }
            }
        }
        summary.records.push(record);
    }
    Ok(summary)
}
