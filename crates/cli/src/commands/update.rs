use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use skillsync_engine::{
    update, DiffClass, GitFetcher, LocalSnapshot, UpdateParams, UpstreamFetcher,
};

/// Handle the `update` command.
pub(crate) fn handle_update_command(
    dest: PathBuf,
    from: Option<PathBuf>,
    repo: Option<String>,
    reference: &str,
    diff: bool,
    dry_run: bool,
) -> Result<()> {
    let snapshot = match (from, repo) {
        (Some(dir), None) => LocalSnapshot::new(dir).fetch_snapshot("local", reference)?,
        (None, Some(url)) => {
            let cache = upstream_cache_dir()?;
            GitFetcher::new(cache).fetch_snapshot(&url, reference)?
        }
        (None, None) => bail!("provide an upstream with --from <DIR> or --repo <URL>"),
        // clap rejects the combination already; kept for direct library calls.
        (Some(_), Some(_)) => bail!("--from and --repo are mutually exclusive"),
    };

    let summary = update(&UpdateParams {
        source_root: snapshot,
        dest_root: dest,
        dry_run,
        show_diff: diff,
    })?;

    for record in &summary.records {
        match record.classification {
            DiffClass::Unchanged => {}
            DiffClass::New => println!("new: {}", record.relative_path.display()),
            DiffClass::Updated => println!("updated: {}", record.relative_path.display()),
        }
        if let Some(text) = &record.diff {
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }
    print!("{}", summary.format_summary());

    if summary.errored > 0 {
        bail!("{} unit(s) failed to apply", summary.errored);
    }
    Ok(())
}

/// Cache directory for upstream clones.
fn upstream_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .context("Could not determine a cache directory")?;
    Ok(base.join("skillsync/upstream"))
}
