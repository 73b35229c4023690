//! Install, uninstall, and upstream-sync engine for skillsync.
//!
//! The engine reconciles an install root against a source content library:
//! placement decides copy versus symlink, the classifier derives an action
//! from the destination's current state, the executor applies it, and the
//! manifest records every placed path so uninstall can remove exactly what
//! was installed. A separate differ pulls upstream snapshots into the
//! library itself.
//!
//! # Examples
//!
//! ```
//! use skillsync_engine::{install, InstallParams, PlacementMode};
//! use tempfile::tempdir;
//!
//! let tmp = tempdir().unwrap();
//! let source = tmp.path().join("library");
//! std::fs::create_dir_all(source.join("commands")).unwrap();
//! std::fs::write(source.join("commands/pr.md"), "# PR").unwrap();
//!
//! let summary = install(&InstallParams {
//!     source_root: source,
//!     install_root: tmp.path().join("project/.tooling"),
//!     mode: PlacementMode::Copy,
//!     dry_run: false,
//!     force: false,
//!     backup: false,
//! })
//! .unwrap();
//! assert_eq!(summary.created, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error type for engine operations.
pub type Error = anyhow::Error;
/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

pub mod classify;
pub mod differ;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod orchestrator;
pub mod placement;
pub mod report;
pub mod upstream;

pub use classify::{classify, inspect_dest, Action, DestinationState};
pub use differ::{
    apply_entry, diff_trees, render_entry_diff, update, DiffClass, UpdateParams, UpdateRecord,
    UpdateSummary, UpstreamDiffEntry,
};
pub use error::EngineError;
pub use executor::{ExecutionResult, ExecutionStatus, Executor};
pub use manifest::{manifest_path, read_manifest, uninstall, write_manifest, MANIFEST_FILE};
pub use orchestrator::{install, validate_params, InstallParams};
pub use placement::{decide_placement, relative_link_target, Placement, PlacementMode};
pub use report::{ItemRecord, RunSummary, UninstallSummary};
pub use upstream::{GitFetcher, LocalSnapshot, UpstreamFetcher};
