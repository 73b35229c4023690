use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `skillsync` application.
#[derive(Debug, Parser)]
#[command(
    name = "skillsync",
    about = "Installs and syncs AI-assistant skill, rule, and agent libraries into projects"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `skillsync` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Installs a content library into a project's install root.
    Install {
        /// Source library root (contains skills/, agents/, commands/, ...).
        source: PathBuf,
        /// Destination install root (created on demand).
        dest: PathBuf,
        /// Place items as copies (the default).
        #[arg(long, conflicts_with = "symlink")]
        copy: bool,
        /// Place items as relative symlinks (skills are still copied).
        #[arg(long, conflicts_with = "copy")]
        symlink: bool,
        /// Preview actions without writing anything.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Permit overwriting destination content that diverges from source.
        #[arg(long, default_value_t = false)]
        force: bool,
        /// With --force, snapshot divergent content before overwriting.
        #[arg(long, default_value_t = false)]
        backup: bool,
        /// List every item's outcome, not just the counters.
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,
        /// Output format: text or json.
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Removes everything the last install placed, driven by the manifest.
    Uninstall {
        /// Install root to clean up.
        dest: PathBuf,
        /// Preview removals without deleting anything.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// List every removed path, not just the counters.
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,
    },
    /// Pulls the latest upstream content into a local library.
    Update {
        /// Library root to update.
        dest: PathBuf,
        /// Use an already-fetched snapshot directory as upstream.
        #[arg(long, value_name = "DIR", conflicts_with = "repo")]
        from: Option<PathBuf>,
        /// Fetch the snapshot from this git repository.
        #[arg(long, value_name = "URL")]
        repo: Option<String>,
        /// Git reference to fetch (with --repo).
        #[arg(long, default_value = "main")]
        reference: String,
        /// Show a bounded diff for each new or changed unit.
        #[arg(long, default_value_t = false)]
        diff: bool,
        /// Preview changes without writing.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Lists the items a library would install (debug aid).
    List {
        /// Source library root.
        source: PathBuf,
    },
}
