//! Upstream snapshot fetching.
//!
//! The differ consumes a local directory; how that directory comes to hold
//! the latest upstream content is injected behind [`UpstreamFetcher`], so
//! the update flow can be tested against a plain local directory instead of
//! real network/VCS calls.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces a local directory containing a snapshot of an upstream source
/// at a given reference.
pub trait UpstreamFetcher {
    /// Fetches (or refreshes) the snapshot and returns its local root.
    fn fetch_snapshot(&self, repo: &str, reference: &str) -> Result<PathBuf>;
}

/// Fetches snapshots by shelling out to `git`.
///
/// Clones into a cache directory keyed by repository name; subsequent
/// fetches update the existing clone and hard-reset it to the requested
/// reference, so the returned tree always matches upstream exactly.
pub struct GitFetcher {
    cache_dir: PathBuf,
}

impl GitFetcher {
    /// Creates a fetcher caching clones under `cache_dir`.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn checkout_dir(&self, repo: &str) -> PathBuf {
        // Last path segment without a trailing `.git`, e.g.
        // "https://host/org/skills.git" -> "skills".
        let slug = repo
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(repo)
            .trim_end_matches(".git");
        let slug = if slug.is_empty() { "upstream" } else { slug };
        self.cache_dir.join(slug)
    }

    fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd
            .output()
            .with_context(|| format!("running git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl UpstreamFetcher for GitFetcher {
    fn fetch_snapshot(&self, repo: &str, reference: &str) -> Result<PathBuf> {
        let checkout = self.checkout_dir(repo);
        if checkout.join(".git").is_dir() {
            tracing::debug!(repo, reference, "Refreshing cached clone");
            Self::run_git(&["fetch", "origin", reference], Some(&checkout))?;
            Self::run_git(&["checkout", "--detach", "FETCH_HEAD"], Some(&checkout))?;
        } else {
            std::fs::create_dir_all(&self.cache_dir)
                .with_context(|| format!("creating cache dir {}", self.cache_dir.display()))?;
            tracing::debug!(repo, reference, "Cloning upstream");
            let dest = checkout.display().to_string();
            Self::run_git(
                &["clone", "--depth", "1", "--branch", reference, repo, &dest],
                None,
            )?;
        }
        Ok(checkout)
    }
}

/// Serves a fixed local directory as the snapshot; for tests and for
/// operators who manage the snapshot themselves.
pub struct LocalSnapshot {
    root: PathBuf,
}

impl LocalSnapshot {
    /// Creates a snapshot provider for an existing directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl UpstreamFetcher for LocalSnapshot {
    fn fetch_snapshot(&self, _repo: &str, _reference: &str) -> Result<PathBuf> {
        if !self.root.is_dir() {
            bail!("snapshot directory not found: {}", self.root.display());
        }
        Ok(self.root.clone())
    }
}
