use anyhow::{bail, Result};
use std::path::PathBuf;

use skillsync_engine::{install, InstallParams, PlacementMode};

/// Handle the `install` command.
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_install_command(
    source: PathBuf,
    dest: PathBuf,
    symlink: bool,
    dry_run: bool,
    force: bool,
    backup: bool,
    verbose: bool,
    format: &str,
) -> Result<()> {
    let mode = if symlink {
        PlacementMode::Symlink
    } else {
        PlacementMode::Copy
    };
    let summary = install(&InstallParams {
        source_root: source,
        install_root: dest,
        mode,
        dry_run,
        force,
        backup,
    })?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "text" => print!("{}", summary.format_summary(verbose)),
        other => bail!("unknown format '{}'. Use 'text' or 'json'", other),
    }

    if summary.has_errors() {
        bail!("{} item(s) failed; see warnings above", summary.errored);
    }
    Ok(())
}
