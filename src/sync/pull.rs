//! Pull: write remote files into the project root

use crate::classify::FileClassifier;
use crate::types::{ProjectFile, RemoteFile, SyncError};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Write remote files under `root_dir`, overwriting local files.
///
/// Every name is mapped to a local path before the first write, so an
/// unmappable name fails the pull with nothing written. Writes then run
/// sequentially; a failed write stops the pull and leaves files written so
/// far in place.
pub fn write_project_files(
    classifier: &FileClassifier,
    remote_files: &[RemoteFile],
    root_dir: &Path,
) -> Result<Vec<ProjectFile>, SyncError> {
    let files = remote_files
        .iter()
        .map(|remote| classifier.to_project_file(remote))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for file in &files {
        if !seen.insert(&file.relative_path) {
            tracing::warn!(
                path = %file.relative_path.display(),
                "several remote files map to the same local path; the last one wins"
            );
        }
    }

    fs::create_dir_all(root_dir).map_err(|source| SyncError::Write {
        path: root_dir.to_path_buf(),
        source,
    })?;

    for file in &files {
        let dest = file.path_from(root_dir);
        let content = file.content.as_deref().unwrap_or_default();
        write_file_atomic(&dest, content.as_bytes())?;
        tracing::debug!(path = %dest.display(), name = %file.local_name, "pulled");
    }

    Ok(files)
}

/// Write `content` to `dest` through a sibling `.part` file and a rename,
/// so an interrupted write never leaves a truncated file behind.
fn write_file_atomic(dest: &Path, content: &[u8]) -> Result<(), SyncError> {
    let write_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| SyncError::Write { path, source }
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(write_error(parent))?;
    }

    let mut part_name = dest.file_name().unwrap_or_default().to_os_string();
    part_name.push(".part");
    let part_path = dest.with_file_name(part_name);

    let result = write_part_then_rename(&part_path, dest, content);
    if result.is_err() {
        // Best-effort cleanup
        let _ = fs::remove_file(&part_path);
    }
    result.map_err(write_error(dest))
}

fn write_part_then_rename(part_path: &Path, dest: &Path, content: &[u8]) -> io::Result<()> {
    let mut part_file = File::create(part_path)?;
    part_file.write_all(content)?;
    part_file.sync_all()?;

    // Drop the file handle before rename (required on Windows)
    drop(part_file);

    fs::rename(part_path, dest)
}
