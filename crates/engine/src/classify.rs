//! Destination inspection and reconciliation classification.

use crate::error::EngineError;
use serde::Serialize;
use std::fs;
use std::path::Path;

use skillsync_discovery::{contents_identical, SyncItem};

/// State of the destination path before acting, computed fresh every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DestinationState {
    /// Nothing at the destination.
    Absent,
    /// A symlink that already resolves to the item's source.
    SymlinkToSource,
    /// A symlink pointing somewhere else (or dangling).
    SymlinkStale,
    /// Regular content, byte-for-byte identical to source.
    RegularContentIdentical,
    /// Regular content that differs from source; presumed an intentional
    /// local customization.
    RegularContentDivergent,
}

/// Action derived from the destination state and operator flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Destination absent; place the item.
    Create,
    /// Divergent content, `--force --backup`: snapshot then replace.
    ReplaceWithBackup,
    /// Divergent content, `--force` alone: replace outright.
    ReplaceNoBackup,
    /// Divergent content without `--force`: leave untouched.
    SkipRepoSpecific,
    /// Destination already matches source.
    SkipUnchanged,
    /// Stale symlink; point it back at the source.
    Relink,
}

/// Inspects the destination path for an item.
///
/// Fails with [`EngineError::SourceNotFound`] when the source has vanished;
/// the caller counts this as a per-item error and continues the run.
pub fn inspect_dest(item: &SyncItem) -> Result<DestinationState, EngineError> {
    if !item.source_path.exists() {
        return Err(EngineError::SourceNotFound {
            path: item.source_path.clone(),
        });
    }

    let meta = match fs::symlink_metadata(&item.dest_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DestinationState::Absent)
        }
        Err(e) => return Err(EngineError::fs("inspect", &item.dest_path, e)),
    };

    if meta.file_type().is_symlink() {
        return Ok(if symlink_resolves_to(&item.dest_path, &item.source_path) {
            DestinationState::SymlinkToSource
        } else {
            DestinationState::SymlinkStale
        });
    }

    let identical = contents_identical(&item.source_path, &item.dest_path)
        .map_err(|e| EngineError::Filesystem {
            op: "compare",
            path: item.dest_path.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
    Ok(if identical {
        DestinationState::RegularContentIdentical
    } else {
        DestinationState::RegularContentDivergent
    })
}

/// Returns true when the symlink at `link` resolves to `source`.
///
/// A dangling link, or one whose resolved target differs from the resolved
/// source, is stale.
fn symlink_resolves_to(link: &Path, source: &Path) -> bool {
    let Ok(target) = fs::read_link(link) else {
        return false;
    };
    let resolved_target = if target.is_absolute() {
        target
    } else {
        link.parent().unwrap_or(Path::new(".")).join(target)
    };
    match (resolved_target.canonicalize(), source.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Derives the action for an item from its destination state.
///
/// Divergent regular content is assumed to be an intentional repo-specific
/// customization and is never clobbered without explicit `force`.
pub fn classify(state: DestinationState, force: bool, backup: bool) -> Action {
    match state {
        DestinationState::Absent => Action::Create,
        DestinationState::SymlinkToSource => Action::SkipUnchanged,
        DestinationState::SymlinkStale => Action::Relink,
        DestinationState::RegularContentIdentical => Action::SkipUnchanged,
        DestinationState::RegularContentDivergent => {
            if !force {
                Action::SkipRepoSpecific
            } else if backup {
                Action::ReplaceWithBackup
            } else {
                Action::ReplaceNoBackup
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillsync_discovery::ItemKind;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn item(source: PathBuf, dest: PathBuf, is_directory: bool) -> SyncItem {
        SyncItem {
            kind: ItemKind::Agent,
            name: "a".into(),
            source_path: source,
            dest_path: dest,
            is_directory,
        }
    }

    #[test]
    fn classify_follows_decision_table() {
        use Action::*;
        use DestinationState::*;
        assert_eq!(classify(Absent, false, false), Create);
        assert_eq!(classify(Absent, true, true), Create);
        assert_eq!(classify(SymlinkToSource, true, true), SkipUnchanged);
        assert_eq!(classify(SymlinkStale, false, false), Relink);
        assert_eq!(classify(RegularContentIdentical, true, false), SkipUnchanged);
        assert_eq!(
            classify(RegularContentDivergent, false, true),
            SkipRepoSpecific
        );
        assert_eq!(
            classify(RegularContentDivergent, true, true),
            ReplaceWithBackup
        );
        assert_eq!(
            classify(RegularContentDivergent, true, false),
            ReplaceNoBackup
        );
    }

    #[test]
    fn absent_dest_detected() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.md");
        std::fs::write(&source, "x").unwrap();
        let it = item(source, tmp.path().join("missing/a.md"), false);
        assert_eq!(inspect_dest(&it).unwrap(), DestinationState::Absent);
    }

    #[test]
    fn missing_source_is_error() {
        let tmp = tempdir().unwrap();
        let it = item(
            tmp.path().join("gone.md"),
            tmp.path().join("dest/a.md"),
            false,
        );
        assert!(matches!(
            inspect_dest(&it),
            Err(EngineError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn identical_and_divergent_regular_content() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.md");
        let dest = tmp.path().join("dest/a.md");
        std::fs::write(&source, "same").unwrap();
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, "same").unwrap();

        let it = item(source.clone(), dest.clone(), false);
        assert_eq!(
            inspect_dest(&it).unwrap(),
            DestinationState::RegularContentIdentical
        );

        std::fs::write(&dest, "hand edited").unwrap();
        assert_eq!(
            inspect_dest(&it).unwrap(),
            DestinationState::RegularContentDivergent
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_source_and_stale_detected() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.md");
        let other = tmp.path().join("other.md");
        let dest = tmp.path().join("dest/a.md");
        std::fs::write(&source, "x").unwrap();
        std::fs::write(&other, "y").unwrap();
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();

        std::os::unix::fs::symlink(&source, &dest).unwrap();
        let it = item(source.clone(), dest.clone(), false);
        assert_eq!(inspect_dest(&it).unwrap(), DestinationState::SymlinkToSource);

        std::fs::remove_file(&dest).unwrap();
        std::os::unix::fs::symlink(&other, &dest).unwrap();
        assert_eq!(inspect_dest(&it).unwrap(), DestinationState::SymlinkStale);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_stale() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.md");
        let dest = tmp.path().join("a-link.md");
        std::fs::write(&source, "x").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("vanished.md"), &dest).unwrap();

        let it = item(source, dest, false);
        assert_eq!(inspect_dest(&it).unwrap(), DestinationState::SymlinkStale);
    }

    #[cfg(unix)]
    #[test]
    fn relative_symlink_to_source_detected() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("library/a.md");
        let dest = tmp.path().join("dest/a.md");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&source, "x").unwrap();
        std::os::unix::fs::symlink("../library/a.md", &dest).unwrap();

        let it = item(source, dest, false);
        assert_eq!(inspect_dest(&it).unwrap(), DestinationState::SymlinkToSource);
    }
}
