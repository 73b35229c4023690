use anyhow::{bail, Result};
use std::path::PathBuf;

use skillsync_engine::uninstall;

/// Handle the `uninstall` command.
pub(crate) fn handle_uninstall_command(dest: PathBuf, dry_run: bool, verbose: bool) -> Result<()> {
    let summary = uninstall(&dest, dry_run)?;
    print!("{}", summary.format_summary(verbose));
    if summary.errored > 0 {
        bail!("{} path(s) could not be removed", summary.errored);
    }
    Ok(())
}
