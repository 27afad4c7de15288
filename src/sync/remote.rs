//! Remote project collaborator

use crate::types::{RemoteFile, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The remote side of a sync.
///
/// `replace_files` receives the complete, ordered file list; replacing the
/// project's previous contents is the implementation's job.
pub trait RemoteProject {
    /// Current remote files
    fn fetch_files(&self) -> Result<Vec<RemoteFile>, SyncError>;

    /// Replace every remote file with `files`, keeping their order
    fn replace_files(&mut self, files: &[RemoteFile]) -> Result<(), SyncError>;
}

/// On-disk image of a remote project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub files: Vec<RemoteFile>,
}

/// A remote project kept in a local JSON file
#[derive(Debug, Clone)]
pub struct SnapshotRemote {
    path: PathBuf,
    script_id: Option<String>,
}

impl SnapshotRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            script_id: None,
        }
    }

    /// Record the project id in snapshots this remote writes
    pub fn with_script_id(mut self, script_id: Option<String>) -> Self {
        self.script_id = script_id;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the snapshot file
    pub fn load(&self) -> Result<Snapshot, SyncError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::Remote(format!(
                    "snapshot not found: {}",
                    self.path.display()
                )))
            }
            Err(e) => return Err(SyncError::Io(e)),
        };
        Ok(serde_json::from_str(&raw)?)
    }
}

impl RemoteProject for SnapshotRemote {
    fn fetch_files(&self) -> Result<Vec<RemoteFile>, SyncError> {
        Ok(self.load()?.files)
    }

    fn replace_files(&mut self, files: &[RemoteFile]) -> Result<(), SyncError> {
        let snapshot = Snapshot {
            script_id: self.script_id.clone(),
            updated_at: Utc::now(),
            files: files.to_vec(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SyncError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, json).map_err(|source| SyncError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            files = files.len(),
            "snapshot written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteType;
    use tempfile::TempDir;

    #[test]
    fn test_replace_then_fetch_keeps_order() {
        let temp = TempDir::new().expect("create temp dir");
        let mut remote = SnapshotRemote::new(temp.path().join("out/remote.json"))
            .with_script_id(Some("abc123".to_string()));

        let files = vec![
            RemoteFile::new("appsscript", RemoteType::Json, "{}"),
            RemoteFile::new("Z", RemoteType::ServerJs, "z()"),
            RemoteFile::new("A", RemoteType::Html, "<a/>"),
        ];
        remote.replace_files(&files).expect("write snapshot");

        assert_eq!(remote.fetch_files().expect("read snapshot"), files);
        assert_eq!(
            remote.load().expect("load").script_id.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_replace_overwrites_previous_files() {
        let temp = TempDir::new().expect("create temp dir");
        let mut remote = SnapshotRemote::new(temp.path().join("remote.json"));

        remote
            .replace_files(&[RemoteFile::new("Old", RemoteType::ServerJs, "")])
            .expect("first push");
        remote
            .replace_files(&[RemoteFile::new("New", RemoteType::ServerJs, "")])
            .expect("second push");

        let names: Vec<_> = remote
            .fetch_files()
            .expect("read")
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["New"]);
    }

    #[test]
    fn test_missing_snapshot_is_remote_error() {
        let temp = TempDir::new().expect("create temp dir");
        let remote = SnapshotRemote::new(temp.path().join("missing.json"));
        assert!(matches!(remote.fetch_files(), Err(SyncError::Remote(_))));
    }

    #[test]
    fn test_corrupt_snapshot_is_snapshot_error() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("remote.json");
        fs::write(&path, "{ not json").expect("write corrupt file");

        let remote = SnapshotRemote::new(path);
        assert!(matches!(remote.fetch_files(), Err(SyncError::Snapshot(_))));
    }
}
