//! Copy-versus-symlink placement decisions.

use crate::error::EngineError;
use pathdiff::diff_paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use skillsync_discovery::SyncItem;

/// Global placement configuration for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Physically duplicate content at the destination.
    Copy,
    /// Reference content with a relative symlink.
    Symlink,
}

/// The placement chosen for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Copy the item.
    Copy,
    /// Symlink the item.
    Symlink,
}

/// Decides how an item is placed at the destination.
///
/// Skills always copy regardless of the global mode: the host tool's skill
/// discovery requires real files. Pure decision function, no side effects.
pub fn decide_placement(item: &SyncItem, mode: PlacementMode) -> Placement {
    if item.kind.forces_copy() {
        return Placement::Copy;
    }
    match mode {
        PlacementMode::Copy => Placement::Copy,
        PlacementMode::Symlink => Placement::Symlink,
    }
}

/// Computes the symlink target for an item as a relative path.
///
/// The target is relative from the destination's parent directory to the
/// resolved (symlink-free) source, so a relocated or freshly cloned project
/// keeps working as long as the relative relationship between install root
/// and source library is preserved.
pub fn relative_link_target(source_path: &Path, dest_path: &Path) -> Result<PathBuf, EngineError> {
    let resolved = source_path
        .canonicalize()
        .map_err(|e| EngineError::fs("resolve source", source_path, e))?;
    let parent = dest_path.parent().unwrap_or(Path::new("."));
    Ok(diff_paths(&resolved, parent).unwrap_or(resolved))
}
