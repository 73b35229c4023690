//! Library crate backing the `skillsync` binary.
//!
//! Parses the command line, wires the engine together, and turns run
//! summaries into terminal output and exit codes. Item-level failures are
//! reported in the summary and surface as a non-zero exit; configuration
//! errors abort before any filesystem mutation.

#![deny(unsafe_code)]

use anyhow::Result;
use clap::Parser;

pub mod cli;
mod commands;

use cli::{Cli, Commands};

/// Parses arguments and runs the selected command.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Install {
            source,
            dest,
            copy: _,
            symlink,
            dry_run,
            force,
            backup,
            verbose,
            format,
        } => commands::handle_install_command(
            source, dest, symlink, dry_run, force, backup, verbose, &format,
        ),
        Commands::Uninstall {
            dest,
            dry_run,
            verbose,
        } => commands::handle_uninstall_command(dest, dry_run, verbose),
        Commands::Update {
            dest,
            from,
            repo,
            reference,
            diff,
            dry_run,
        } => commands::handle_update_command(dest, from, repo, &reference, diff, dry_run),
        Commands::List { source } => commands::handle_list_command(source),
    }
}
