//! # scriptsync - Local project sync for remote script projects
//!
//! Walks a local project tree, decides which files belong to the remote
//! project, and pushes or pulls them as one ordered, typed file list.
//!
//! The library prints nothing; the `scriptsync` binary owns all output.

// Module declarations
pub mod classify;
pub mod commands;
pub mod config;
pub mod hash;
pub mod logging;
pub mod order;
pub mod patterns;
pub mod scanner;
pub mod sync;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use classify::FileClassifier;
pub use config::Config;
pub use patterns::IgnoreMatcher;
pub use sync::{RemoteProject, SnapshotRemote, SyncEngine};
pub use types::{ProjectFile, RemoteFile, RemoteType, SyncError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
