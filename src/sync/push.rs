//! Push: assemble the ordered, content-populated upload

use crate::hash::payload_digest;
use crate::types::{NameCollision, ProjectFile, RemoteFile, RemoteType, SyncError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything one push uploads, in upload order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPayload {
    /// Manifest first, then the resolved push order; content attached
    pub files: Vec<ProjectFile>,

    /// Files the walk left out
    pub untracked: Vec<ProjectFile>,
}

impl PushPayload {
    /// Build the payload from a content-populated manifest and ordered files
    pub fn assemble(
        manifest: ProjectFile,
        ordered: Vec<ProjectFile>,
        untracked: Vec<ProjectFile>,
    ) -> Self {
        let mut files = Vec::with_capacity(ordered.len() + 1);
        files.push(manifest);
        files.extend(ordered);
        Self { files, untracked }
    }

    /// Remote view of the payload, in upload order
    pub fn remote_files(&self) -> Vec<RemoteFile> {
        self.files
            .iter()
            .filter_map(ProjectFile::to_remote_file)
            .collect()
    }

    /// blake3 digest of the serialized remote files
    pub fn digest(&self) -> Result<String, SyncError> {
        payload_digest(&self.remote_files())
    }

    /// Total bytes of source uploaded
    pub fn total_bytes(&self) -> u64 {
        self.files
            .iter()
            .filter_map(|file| file.content.as_ref())
            .map(|content| content.len() as u64)
            .sum()
    }
}

/// Outcome of a completed push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub pushed: Vec<ProjectFile>,
    pub untracked: Vec<ProjectFile>,
    pub digest: String,
}

/// Fail when two tracked files share a remote name and type
pub fn check_collisions(files: &[ProjectFile]) -> Result<(), SyncError> {
    let mut groups: BTreeMap<(&str, RemoteType), Vec<PathBuf>> = BTreeMap::new();

    for file in files.iter().filter(|file| !file.is_ignored) {
        if let Some(remote_type) = file.remote_type {
            groups
                .entry((file.local_name.as_str(), remote_type))
                .or_default()
                .push(file.relative_path.clone());
        }
    }

    let collisions: Vec<NameCollision> = groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((name, remote_type), paths)| NameCollision {
            name: name.to_string(),
            remote_type,
            paths,
        })
        .collect();

    if collisions.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Ambiguous { collisions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UntrackedReason;

    fn script(path: &str, name: &str) -> ProjectFile {
        ProjectFile::tracked(PathBuf::from(path), name.to_string(), RemoteType::ServerJs)
    }

    #[test]
    fn test_no_collisions() {
        let files = vec![
            script("Code.js", "Code"),
            ProjectFile::tracked(PathBuf::from("Code.html"), "Code".to_string(), RemoteType::Html),
        ];
        assert!(check_collisions(&files).is_ok());
    }

    #[test]
    fn test_collisions_report_every_path() {
        let files = vec![
            script("my.util.js", "my.util"),
            script("my/util.js", "my.util"),
            script("Code.js", "Code"),
            script("Code.gs", "Code"),
            script("Other.js", "Other"),
        ];

        match check_collisions(&files) {
            Err(SyncError::Ambiguous { collisions }) => {
                assert_eq!(collisions.len(), 2);
                assert_eq!(collisions[0].name, "Code");
                assert_eq!(
                    collisions[0].paths,
                    vec![PathBuf::from("Code.js"), PathBuf::from("Code.gs")]
                );
                assert_eq!(collisions[1].name, "my.util");
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_ignored_files_never_collide() {
        let files = vec![
            script("Code.js", "Code"),
            ProjectFile::untracked(
                PathBuf::from("Code.gs"),
                "Code".to_string(),
                Some(RemoteType::ServerJs),
                UntrackedReason::IgnoreRule,
            ),
        ];
        assert!(check_collisions(&files).is_ok());
    }

    #[test]
    fn test_payload_puts_manifest_first() {
        let manifest = ProjectFile::tracked(
            PathBuf::from("appsscript.json"),
            "appsscript".to_string(),
            RemoteType::Json,
        )
        .with_content("{}".to_string());
        let ordered = vec![
            script("B.js", "B").with_content("b".to_string()),
            script("A.js", "A").with_content("aa".to_string()),
        ];

        let payload = PushPayload::assemble(manifest, ordered, Vec::new());
        let names: Vec<_> = payload.remote_files().into_iter().map(|f| f.name).collect();

        assert_eq!(names, vec!["appsscript", "B", "A"]);
        assert_eq!(payload.total_bytes(), 5);
    }

    #[test]
    fn test_digest_depends_on_order() {
        let manifest = ProjectFile::tracked(
            PathBuf::from("appsscript.json"),
            "appsscript".to_string(),
            RemoteType::Json,
        )
        .with_content("{}".to_string());
        let a = script("A.js", "A").with_content("a".to_string());
        let b = script("B.js", "B").with_content("b".to_string());

        let ab = PushPayload::assemble(manifest.clone(), vec![a.clone(), b.clone()], Vec::new());
        let ba = PushPayload::assemble(manifest, vec![b, a], Vec::new());

        assert_ne!(ab.digest().expect("digest"), ba.digest().expect("digest"));
        assert_eq!(ab.digest().expect("digest"), ab.clone().digest().expect("digest"));
    }
}
