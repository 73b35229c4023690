//! Top-level install flow: discover, classify, execute, persist manifest.

use crate::classify::{classify, inspect_dest};
use crate::error::EngineError;
use crate::executor::{ExecutionResult, ExecutionStatus, Executor};
use crate::manifest::{clear_manifest, write_manifest};
use crate::placement::PlacementMode;
use crate::report::RunSummary;
use anyhow::Result;
use std::path::PathBuf;

use skillsync_discovery::discover_items;

/// Parameters for one install run.
#[derive(Debug, Clone)]
pub struct InstallParams {
    /// Root of the source content library.
    pub source_root: PathBuf,
    /// Destination install root.
    pub install_root: PathBuf,
    /// Global placement mode.
    pub mode: PlacementMode,
    /// Report without mutating the filesystem.
    pub dry_run: bool,
    /// Permit overwriting divergent destination content.
    pub force: bool,
    /// Snapshot divergent content before overwriting (requires `force`).
    pub backup: bool,
}

/// Validates an install configuration before any filesystem mutation.
///
/// Configuration errors are fatal; ambiguous intent must never reach the
/// executor.
pub fn validate_params(params: &InstallParams) -> Result<(), EngineError> {
    if params.backup && !params.force {
        return Err(EngineError::Config {
            message: "--backup requires --force (nothing is overwritten without --force)".into(),
        });
    }
    if !cfg!(unix) && params.mode == PlacementMode::Symlink {
        return Err(EngineError::Config {
            message: "--symlink placement is only supported on unix".into(),
        });
    }
    if !params.source_root.is_dir() {
        return Err(EngineError::Config {
            message: format!(
                "source library not found: {}",
                params.source_root.display()
            ),
        });
    }
    Ok(())
}

/// Runs a full install: reconciles the install root against the source
/// library and, for non-dry runs, rewrites the manifest to this run's
/// footprint.
///
/// Item-level failures are counted and the run continues; only
/// configuration errors abort.
pub fn install(params: &InstallParams) -> Result<RunSummary> {
    validate_params(params)?;

    let items = discover_items(&params.source_root, &params.install_root)?;
    tracing::debug!(
        count = items.len(),
        source = %params.source_root.display(),
        dest = %params.install_root.display(),
        "Discovered items"
    );

    if !params.dry_run {
        clear_manifest(&params.install_root)?;
    }

    let mut summary = RunSummary::new(params.dry_run);
    let mut executor = Executor::new(params.mode, params.dry_run);

    for item in &items {
        let result = match inspect_dest(item) {
            Ok(state) => {
                let action = classify(state, params.force, params.backup);
                executor.execute(item, action)
            }
            Err(err) => {
                tracing::warn!(
                    source = %item.source_path.display(),
                    error = %err,
                    "Skipping item"
                );
                ExecutionResult {
                    status: ExecutionStatus::Errored,
                    message: Some(err.to_string()),
                }
            }
        };
        summary.record(item, &result);
    }

    if !params.dry_run {
        write_manifest(&params.install_root, &executor.into_manifest())?;
    }
    Ok(summary)
}
