//! Hashing utilities

use crate::types::{RemoteFile, SyncError};

/// Compute the Blake3 digest of an upload payload
///
/// The files are serialized to JSON in the given order, so the digest
/// changes when content, names, types, or upload order change. Two pushes
/// of an unchanged project produce the same digest.
///
/// # Example
/// ```
/// use scriptsync::hash::payload_digest;
/// use scriptsync::types::{RemoteFile, RemoteType};
///
/// let files = vec![RemoteFile::new("Code", RemoteType::ServerJs, "function f() {}")];
/// let digest = payload_digest(&files)?;
/// assert_eq!(digest.len(), 64);
/// # Ok::<(), scriptsync::types::SyncError>(())
/// ```
pub fn payload_digest(files: &[RemoteFile]) -> Result<String, SyncError> {
    let mut hasher = blake3::Hasher::new();

    for file in files {
        let bytes = serde_json::to_vec(file)?;
        // Length prefix keeps file boundaries unambiguous
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
