//! Error types for scriptsync

use super::RemoteType;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Two or more tracked files that resolve to the same remote identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    pub remote_type: RemoteType,
    pub paths: Vec<PathBuf>,
}

impl fmt::Display for NameCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        write!(
            f,
            "{} ({}) <- {}",
            self.name,
            self.remote_type,
            paths.join(", ")
        )
    }
}

fn format_collisions(collisions: &[NameCollision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error types for scriptsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Project root, config file or ignore file could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Several local files map onto one remote file
    #[error("Ambiguous project files: {}", format_collisions(.collisions))]
    Ambiguous { collisions: Vec<NameCollision> },

    /// Writing a pulled file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a tracked file during push failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote file name that cannot be mapped inside the project root
    #[error("Remote file name cannot be mapped to a local path: {name:?}")]
    InvalidRemoteName { name: String },

    /// Push without a tracked manifest
    #[error("Manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    /// Failure reported by the remote collaborator
    #[error("Remote error: {0}")]
    Remote(String),

    /// Snapshot (de)serialization failure
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl SyncError {
    /// Check if this error stems from project configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }

    /// Check if this error was raised before anything was uploaded or written
    pub fn is_preflight_error(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_)
                | SyncError::Ambiguous { .. }
                | SyncError::InvalidRemoteName { .. }
                | SyncError::ManifestMissing { .. }
        )
    }

    /// Path the error refers to, when there is exactly one
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SyncError::Write { path, .. }
            | SyncError::Read { path, .. }
            | SyncError::ManifestMissing { path } => Some(path),
            _ => None,
        }
    }
}
