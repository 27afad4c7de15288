//! Bounded concurrent content loading for push.
//!
//! Order is fixed before any read starts: each task owns one slot of the
//! output, so the completion order of reads never changes the payload.

use crate::types::{ProjectFile, SyncError};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Builder;
use tokio::sync::Semaphore;

/// Default number of files read at the same time
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 8;

/// Attach file content to every file, at most `max_concurrent` reads in flight.
///
/// Returns the files in their input order. The first failed read (in input
/// order) is returned as `SyncError::Read`.
pub fn load_contents(
    root: &Path,
    files: Vec<ProjectFile>,
    max_concurrent: usize,
) -> Result<Vec<ProjectFile>, SyncError> {
    load_with(root, files, max_concurrent, |path| async move {
        tokio::fs::read_to_string(&path).await
    })
}

/// `load_contents` with the read operation supplied by the caller
fn load_with<R, Fut>(
    root: &Path,
    files: Vec<ProjectFile>,
    max_concurrent: usize,
    read: R,
) -> Result<Vec<ProjectFile>, SyncError>
where
    R: Fn(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<String>> + Send + 'static,
{
    if files.is_empty() {
        return Ok(files);
    }

    let permits = max_concurrent.max(1);
    let runtime = Builder::new_multi_thread()
        .worker_threads(permits.min(files.len()))
        .enable_all()
        .build()
        .map_err(SyncError::Io)?;

    let paths: Vec<PathBuf> = files.iter().map(|file| file.path_from(root)).collect();

    let contents = runtime.block_on(async move {
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let semaphore = Arc::clone(&semaphore);
            let reading = read(path.clone());
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SyncError::Io(io::Error::other(e)))?;
                reading
                    .await
                    .map_err(|source| SyncError::Read { path, source })
            }));
        }

        let mut contents = Vec::with_capacity(handles.len());
        for handle in handles {
            let content = handle.await.map_err(map_join_error)??;
            contents.push(content);
        }
        Ok::<_, SyncError>(contents)
    })?;

    tracing::debug!(files = contents.len(), permits, "file contents loaded");

    Ok(files
        .into_iter()
        .zip(contents)
        .map(|(file, content)| file.with_content(content))
        .collect())
}

fn map_join_error(error: tokio::task::JoinError) -> SyncError {
    SyncError::Io(io::Error::other(format!(
        "content reader task failed: {}",
        error
    )))
}
