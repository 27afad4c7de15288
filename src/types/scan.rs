//! ProjectScan - Every file one walk discovered, tracked and ignored

use super::ProjectFile;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of walking a project root
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectScan {
    /// Files in discovery order
    pub files: Vec<ProjectFile>,

    /// Directories skipped by ignore rules
    pub pruned_dirs: usize,

    /// Scan metadata
    pub scan_duration: Duration,
    pub root_path: PathBuf,
}

impl ProjectScan {
    /// Create a new empty scan
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            files: Vec::new(),
            pruned_dirs: 0,
            scan_duration: Duration::from_secs(0),
            root_path,
        }
    }

    /// Append a discovered file
    pub fn push(&mut self, file: ProjectFile) {
        self.files.push(file);
    }

    /// Files that take part in a push, in discovery order
    pub fn tracked(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(|file| !file.is_ignored)
    }

    /// Files left out of a push, in discovery order
    pub fn untracked(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(|file| file.is_ignored)
    }

    /// Split into (tracked, untracked), both in discovery order
    pub fn into_partition(self) -> (Vec<ProjectFile>, Vec<ProjectFile>) {
        self.files.into_iter().partition(|file| !file.is_ignored)
    }

    /// Look up a file by its root-relative path
    pub fn get(&self, relative_path: &Path) -> Option<&ProjectFile> {
        self.files
            .iter()
            .find(|file| file.relative_path == relative_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Set the scan duration after scanning completes
    pub fn set_scan_duration(&mut self, duration: Duration) {
        self.scan_duration = duration;
    }
}
