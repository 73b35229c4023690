//! Applies classified actions to the filesystem.
//!
//! Side effects are confined to the install-root subtree; source content is
//! never touched. Individual item failures are reported per item and do not
//! abort the run.

use crate::classify::Action;
use crate::error::EngineError;
use crate::placement::{decide_placement, relative_link_target, Placement, PlacementMode};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use skillsync_discovery::SyncItem;

/// Final status of one executed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    /// Placed at a previously absent destination.
    Created,
    /// Replaced or relinked to match source.
    Updated,
    /// Already matched source; nothing done.
    SkippedUnchanged,
    /// Divergent local customization preserved.
    SkippedRepoSpecific,
    /// The action failed; the run continues with remaining items.
    Errored,
}

/// Result of executing one action.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Final status.
    pub status: ExecutionStatus,
    /// Optional detail (error text, backup location).
    pub message: Option<String>,
}

impl ExecutionResult {
    fn new(status: ExecutionStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    fn with_message(status: ExecutionStatus, message: String) -> Self {
        Self {
            status,
            message: Some(message),
        }
    }
}

/// Executes actions for a run, accumulating the manifest buffer.
pub struct Executor {
    mode: PlacementMode,
    dry_run: bool,
    manifest: Vec<PathBuf>,
}

impl Executor {
    /// Creates an executor for one run.
    pub fn new(mode: PlacementMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            manifest: Vec::new(),
        }
    }

    /// Consumes the executor, returning every destination path this run
    /// placed or confirmed, in processing order.
    pub fn into_manifest(self) -> Vec<PathBuf> {
        self.manifest
    }

    /// Applies one action. Failures are captured as `Errored` results.
    pub fn execute(&mut self, item: &SyncItem, action: Action) -> ExecutionResult {
        match self.try_execute(item, action) {
            Ok(result) => {
                // Skipped-repo-specific content is the user's, not ours;
                // everything else the engine owns and must uninstall later.
                if result.status != ExecutionStatus::SkippedRepoSpecific {
                    self.manifest.push(item.dest_path.clone());
                }
                result
            }
            Err(err) => {
                tracing::warn!(
                    dest = %item.dest_path.display(),
                    error = %err,
                    "Item failed; continuing with remaining items"
                );
                ExecutionResult::with_message(ExecutionStatus::Errored, err.to_string())
            }
        }
    }

    fn try_execute(
        &self,
        item: &SyncItem,
        action: Action,
    ) -> Result<ExecutionResult, EngineError> {
        match action {
            Action::SkipUnchanged => Ok(ExecutionResult::new(ExecutionStatus::SkippedUnchanged)),
            Action::SkipRepoSpecific => {
                Ok(ExecutionResult::new(ExecutionStatus::SkippedRepoSpecific))
            }
            Action::Create => {
                if !self.dry_run {
                    self.place(item)?;
                }
                Ok(ExecutionResult::new(ExecutionStatus::Created))
            }
            Action::Relink | Action::ReplaceNoBackup => {
                if !self.dry_run {
                    remove_path(&item.dest_path)?;
                    self.place(item)?;
                }
                Ok(ExecutionResult::new(ExecutionStatus::Updated))
            }
            Action::ReplaceWithBackup => {
                if self.dry_run {
                    return Ok(ExecutionResult::with_message(
                        ExecutionStatus::Updated,
                        "would back up existing content".into(),
                    ));
                }
                let backup = backup_target(&item.dest_path);
                copy_any(&item.dest_path, &backup)?;
                remove_path(&item.dest_path)?;
                self.place(item)?;
                Ok(ExecutionResult::with_message(
                    ExecutionStatus::Updated,
                    format!("backed up to {}", backup.display()),
                ))
            }
        }
    }

    /// Places the item at its destination per the placement decision.
    fn place(&self, item: &SyncItem) -> Result<(), EngineError> {
        if let Some(parent) = item.dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::fs("create parent", parent, e))?;
        }
        match decide_placement(item, self.mode) {
            Placement::Copy => copy_any(&item.source_path, &item.dest_path),
            Placement::Symlink => {
                let target = relative_link_target(&item.source_path, &item.dest_path)?;
                create_symlink(&target, &item.dest_path)
                    .map_err(|e| EngineError::fs("symlink", &item.dest_path, e))
            }
        }
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::other(
        "symlink placement is only supported on unix",
    ))
}

/// Copies a file or directory tree.
fn copy_any(src: &Path, dest: &Path) -> Result<(), EngineError> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        fs::copy(src, dest)
            .map(|_| ())
            .map_err(|e| EngineError::fs("copy", dest, e))
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dest).map_err(|e| EngineError::fs("create dir", dest, e))?;
    let entries = fs::read_dir(src).map_err(|e| EngineError::fs("read dir", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::fs("read dir", src, e))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)
                .map(|_| ())
                .map_err(|e| EngineError::fs("copy", &dest_path, e))?;
        }
    }
    Ok(())
}

/// Removes whatever sits at `path` (file, symlink, or directory tree).
fn remove_path(path: &Path) -> Result<(), EngineError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(EngineError::fs("inspect", path, e)),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| EngineError::fs("remove dir", path, e))
    } else {
        // Covers regular files and symlinks (including links to directories).
        fs::remove_file(path).map_err(|e| EngineError::fs("remove", path, e))
    }
}

/// Picks a backup path next to `dest` that does not collide with a prior
/// backup: `<name>.bak`, then `<name>.bak.1`, `<name>.bak.2`, ...
fn backup_target(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "backup".to_string());
    let mut candidate = dest.with_file_name(format!("{file_name}.bak"));
    let mut counter = 0u32;
    while fs::symlink_metadata(&candidate).is_ok() {
        counter += 1;
        candidate = dest.with_file_name(format!("{file_name}.bak.{counter}"));
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillsync_discovery::ItemKind;
    use tempfile::tempdir;

    fn file_item(source: &Path, dest: &Path) -> SyncItem {
        SyncItem {
            kind: ItemKind::Command,
            name: "cmd".into(),
            source_path: source.to_path_buf(),
            dest_path: dest.to_path_buf(),
            is_directory: false,
        }
    }

    fn dir_item(source: &Path, dest: &Path) -> SyncItem {
        SyncItem {
            kind: ItemKind::Skill,
            name: "skill".into(),
            source_path: source.to_path_buf(),
            dest_path: dest.to_path_buf(),
            is_directory: true,
        }
    }

    #[test]
    fn create_copies_file_and_records_manifest() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/commands/pr.md");
        fs::write(&source, "content").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, false);
        let result = exec.execute(&file_item(&source, &dest), Action::Create);
        assert_eq!(result.status, ExecutionStatus::Created);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "content");
        assert_eq!(exec.into_manifest(), vec![dest]);
    }

    #[test]
    fn create_copies_directory_recursively() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("skills/tdd");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("SKILL.md"), "skill").unwrap();
        fs::write(source.join("sub/helper.py"), "x = 1").unwrap();
        let dest = tmp.path().join("install/skills/tdd");

        let mut exec = Executor::new(PlacementMode::Copy, false);
        let result = exec.execute(&dir_item(&source, &dest), Action::Create);
        assert_eq!(result.status, ExecutionStatus::Created);
        assert_eq!(fs::read_to_string(dest.join("SKILL.md")).unwrap(), "skill");
        assert_eq!(
            fs::read_to_string(dest.join("sub/helper.py")).unwrap(),
            "x = 1"
        );
    }

    #[cfg(unix)]
    #[test]
    fn create_symlink_points_back_to_source() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("library/agents/reviewer.md");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "agent").unwrap();
        let dest = tmp.path().join("install/agents/reviewer.md");

        let mut exec = Executor::new(PlacementMode::Symlink, false);
        let result = exec.execute(&file_item(&source, &dest), Action::Create);
        assert_eq!(result.status, ExecutionStatus::Created);

        let target = fs::read_link(&dest).unwrap();
        assert!(target.is_relative());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "agent");
    }

    #[cfg(unix)]
    #[test]
    fn skills_are_copied_even_in_symlink_mode() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("skills/tdd");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("SKILL.md"), "skill").unwrap();
        let dest = tmp.path().join("install/skills/tdd");

        let mut exec = Executor::new(PlacementMode::Symlink, false);
        exec.execute(&dir_item(&source, &dest), Action::Create);
        assert!(!fs::symlink_metadata(&dest).unwrap().file_type().is_symlink());
        assert!(dest.join("SKILL.md").exists());
    }

    #[test]
    fn replace_with_backup_preserves_original() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/commands/pr.md");
        fs::write(&source, "upstream").unwrap();
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "hand edited").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, false);
        let result = exec.execute(&file_item(&source, &dest), Action::ReplaceWithBackup);
        assert_eq!(result.status, ExecutionStatus::Updated);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "upstream");

        let backup = dest.with_file_name("pr.md.bak");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "hand edited");
    }

    #[test]
    fn second_backup_gets_disambiguating_suffix() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/pr.md");
        fs::write(&source, "upstream").unwrap();
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "first edit").unwrap();
        fs::write(dest.with_file_name("pr.md.bak"), "older backup").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, false);
        exec.execute(&file_item(&source, &dest), Action::ReplaceWithBackup);

        assert_eq!(
            fs::read_to_string(dest.with_file_name("pr.md.bak")).unwrap(),
            "older backup"
        );
        assert_eq!(
            fs::read_to_string(dest.with_file_name("pr.md.bak.1")).unwrap(),
            "first edit"
        );
    }

    #[cfg(unix)]
    #[test]
    fn relink_replaces_stale_symlink() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.md");
        let stale = tmp.path().join("old.md");
        let dest = tmp.path().join("install/a.md");
        fs::write(&source, "current").unwrap();
        fs::write(&stale, "old").unwrap();
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&stale, &dest).unwrap();

        let mut exec = Executor::new(PlacementMode::Symlink, false);
        let result = exec.execute(&file_item(&source, &dest), Action::Relink);
        assert_eq!(result.status, ExecutionStatus::Updated);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "current");
    }

    #[test]
    fn dry_run_mutates_nothing() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/commands/pr.md");
        fs::write(&source, "content").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, true);
        let result = exec.execute(&file_item(&source, &dest), Action::Create);
        assert_eq!(result.status, ExecutionStatus::Created);
        assert!(!dest.exists());
        assert!(!tmp.path().join("install").exists());
    }

    #[test]
    fn skip_repo_specific_stays_out_of_manifest() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/pr.md");
        fs::write(&source, "x").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, false);
        exec.execute(&file_item(&source, &dest), Action::SkipRepoSpecific);
        assert!(exec.into_manifest().is_empty());
    }

    #[test]
    fn unchanged_items_stay_in_manifest() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pr.md");
        let dest = tmp.path().join("install/pr.md");
        fs::write(&source, "x").unwrap();

        let mut exec = Executor::new(PlacementMode::Copy, false);
        exec.execute(&file_item(&source, &dest), Action::SkipUnchanged);
        assert_eq!(exec.into_manifest(), vec![dest]);
    }

    #[test]
    fn failed_copy_reports_errored() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("gone.md");
        let dest = tmp.path().join("install/gone.md");

        let mut exec = Executor::new(PlacementMode::Copy, false);
        let result = exec.execute(&file_item(&source, &dest), Action::Create);
        assert_eq!(result.status, ExecutionStatus::Errored);
        assert!(result.message.is_some());
        assert!(exec.into_manifest().is_empty());
    }
}
