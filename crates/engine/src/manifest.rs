//! Install manifest persistence and manifest-driven uninstall.
//!
//! The manifest records every destination path an install run placed or
//! confirmed, one absolute path per line. It is the engine's private file;
//! uninstall replays it top to bottom and removes exactly what was
//! installed, nothing else.

use crate::error::EngineError;
use crate::report::UninstallSummary;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name, placed in the install root's parent directory.
pub const MANIFEST_FILE: &str = ".skillsync-manifest";

/// Returns the manifest path for an install root.
///
/// The manifest lives next to the install root rather than inside it, so
/// uninstalling the whole root never deletes the record driving the
/// uninstall. A root with no parent keeps the manifest inside itself.
pub fn manifest_path(install_root: &Path) -> PathBuf {
    install_root
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(install_root)
        .join(MANIFEST_FILE)
}

/// Removes any prior manifest so a fresh install's footprint replaces the
/// previous one.
pub fn clear_manifest(install_root: &Path) -> Result<()> {
    let path = manifest_path(install_root);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EngineError::fs("remove manifest", path, e).into()),
    }
}

/// Writes the manifest for a completed install run.
///
/// The write goes to a temp file in the same directory and is renamed into
/// place, so a crash mid-write never leaves a half-written manifest.
pub fn write_manifest(install_root: &Path, paths: &[PathBuf]) -> Result<()> {
    let path = manifest_path(install_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory {}", parent.display()))?;
    }
    let mut content = String::new();
    for p in paths {
        content.push_str(&p.display().to_string());
        content.push('\n');
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(|e| EngineError::fs("write manifest", &tmp, e))?;
    fs::rename(&tmp, &path).map_err(|e| EngineError::fs("rename manifest", &path, e))?;
    Ok(())
}

/// Reads the manifest lines, or `None` when no manifest exists.
pub fn read_manifest(install_root: &Path) -> Result<Option<Vec<String>>> {
    let path = manifest_path(install_root);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content.lines().map(|l| l.to_string()).collect())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EngineError::fs("read manifest", path, e).into()),
    }
}

/// Replays the manifest, removing each recorded path that still exists.
///
/// Already-absent paths count as missing, not errors. Lines that cannot be
/// interpreted are skipped and counted. After a successful non-dry-run
/// uninstall the manifest file itself is deleted. No manifest at all is a
/// valid no-op.
pub fn uninstall(install_root: &Path, dry_run: bool) -> Result<UninstallSummary> {
    let mut summary = UninstallSummary {
        dry_run,
        ..Default::default()
    };
    let Some(lines) = read_manifest(install_root)? else {
        tracing::debug!(root = %install_root.display(), "No manifest; nothing to undo");
        return Ok(summary);
    };

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let path = PathBuf::from(trimmed);
        if !path.is_absolute() {
            let err = EngineError::ManifestCorrupt {
                line: index + 1,
                reason: "not an absolute path".into(),
            };
            tracing::warn!(error = %err, "Skipping manifest line");
            summary.corrupt_lines += 1;
            continue;
        }
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                summary.missing += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot inspect manifest path");
                summary.errored += 1;
                continue;
            }
        };
        if !dry_run {
            let removal = if meta.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removal {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove installed path");
                summary.errored += 1;
                continue;
            }
        }
        summary.removed += 1;
        summary.removed_paths.push(path);
    }

    if !dry_run {
        clear_manifest(install_root)?;
    }
    Ok(summary)
}
