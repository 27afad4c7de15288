//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scriptsync - Push and pull a local script project against its remote copy
#[derive(Parser, Debug)]
#[command(name = "scriptsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory holding .scriptsync.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List tracked and untracked project files
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Replace the remote project with the local files
    ///
    /// Examples:
    ///   scriptsync push --dry-run           # Show upload order and digest
    ///   scriptsync push --to remote.json    # Write to a snapshot file
    Push {
        /// Show what would be uploaded without touching the remote
        #[arg(long)]
        dry_run: bool,

        /// Remote snapshot file (overrides `remote` in .scriptsync.toml)
        #[arg(long, value_name = "FILE")]
        to: Option<PathBuf>,
    },

    /// Overwrite local files with the remote project
    Pull {
        /// Remote snapshot file (overrides `remote` in .scriptsync.toml)
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
}
