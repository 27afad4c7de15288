//! Synchronization engine: pull and push between a project root and a remote

mod pull;
mod push;
mod reader;
mod remote;

pub use pull::write_project_files;
pub use push::{check_collisions, PushPayload, PushReport};
pub use reader::{load_contents, DEFAULT_MAX_CONCURRENT_READS};
pub use remote::{RemoteProject, Snapshot, SnapshotRemote};

use crate::classify::FileClassifier;
use crate::order::order_push_files;
use crate::patterns::IgnoreMatcher;
use crate::scanner::{scan_project, ProgressCallback};
use crate::types::{ProjectFile, ProjectScan, SyncError};
use std::path::{Path, PathBuf};

/// Everything one pull or push needs, resolved once per invocation
pub struct SyncEngine {
    matcher: IgnoreMatcher,
    classifier: FileClassifier,
    push_order: Option<Vec<String>>,
    max_concurrent_reads: usize,
    on_progress: Option<ProgressCallback>,
}

impl SyncEngine {
    pub fn new(matcher: IgnoreMatcher, classifier: FileClassifier) -> Self {
        Self {
            matcher,
            classifier,
            push_order: None,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
            on_progress: None,
        }
    }

    /// Explicit push order; `None` keeps discovery order
    pub fn with_push_order(mut self, push_order: Option<Vec<String>>) -> Self {
        self.push_order = push_order;
        self
    }

    pub fn with_max_concurrent_reads(mut self, max_concurrent_reads: usize) -> Self {
        self.max_concurrent_reads = max_concurrent_reads.max(1);
        self
    }

    /// Callback fed the number of files seen while walking
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn matcher(&self) -> &IgnoreMatcher {
        &self.matcher
    }

    pub fn classifier(&self) -> &FileClassifier {
        &self.classifier
    }

    /// Walk `root_dir` once, tagging every file tracked or ignored
    pub fn scan(&self, root_dir: &Path) -> Result<ProjectScan, SyncError> {
        scan_project(
            root_dir,
            &self.matcher,
            &self.classifier,
            self.on_progress.as_ref(),
        )
    }

    /// Tracked files in discovery order, without content.
    ///
    /// Fails with `SyncError::Ambiguous` when two tracked files share a
    /// remote name and type.
    pub fn collect_local_files(&self, root_dir: &Path) -> Result<Vec<ProjectFile>, SyncError> {
        let (tracked, _) = self.scan(root_dir)?.into_partition();
        check_collisions(&tracked)?;
        Ok(tracked)
    }

    /// Paths of every file the walk left out, joined onto `root_dir`
    pub fn get_untracked_files(&self, root_dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
        let (_, untracked) = self.scan(root_dir)?.into_partition();
        Ok(untracked
            .iter()
            .map(|file| file.path_from(root_dir))
            .collect())
    }

    /// Write remote files under `root_dir`; see [`write_project_files`]
    pub fn write_project_files(
        &self,
        remote_files: &[crate::types::RemoteFile],
        root_dir: &Path,
    ) -> Result<Vec<ProjectFile>, SyncError> {
        write_project_files(&self.classifier, remote_files, root_dir)
    }

    /// Upload order for tracked files; see [`order_push_files`]
    pub fn get_ordered_project_files(
        &self,
        files: &[ProjectFile],
        explicit_order: Option<&[String]>,
    ) -> Vec<ProjectFile> {
        order_push_files(files, explicit_order)
    }

    /// Walk, check, order, and read everything a push uploads, without
    /// touching the remote
    pub fn prepare_push(&self, root_dir: &Path) -> Result<PushPayload, SyncError> {
        let (tracked, untracked) = self.scan(root_dir)?.into_partition();
        check_collisions(&tracked)?;

        let manifest = tracked
            .iter()
            .find(|file| file.is_manifest())
            .cloned()
            .ok_or_else(|| SyncError::ManifestMissing {
                path: root_dir.join(self.classifier.manifest()),
            })?;

        let ordered = self.get_ordered_project_files(&tracked, self.push_order.as_deref());

        let mut upload = Vec::with_capacity(ordered.len() + 1);
        upload.push(manifest);
        upload.extend(ordered);
        let mut loaded = load_contents(root_dir, upload, self.max_concurrent_reads)?;

        let manifest = loaded.remove(0);
        tracing::debug!(
            files = loaded.len() + 1,
            untracked = untracked.len(),
            "push payload assembled"
        );
        Ok(PushPayload::assemble(manifest, loaded, untracked))
    }

    /// Replace the remote's files with the local project.
    ///
    /// Pushing an unchanged tree twice hands the remote the same payload
    /// and reports the same digest.
    pub fn push(
        &self,
        root_dir: &Path,
        remote: &mut dyn RemoteProject,
    ) -> Result<PushReport, SyncError> {
        let payload = self.prepare_push(root_dir)?;
        let remote_files = payload.remote_files();
        let digest = payload.digest()?;

        remote.replace_files(&remote_files)?;
        tracing::info!(files = remote_files.len(), %digest, "pushed");

        Ok(PushReport {
            pushed: payload.files,
            untracked: payload.untracked,
            digest,
        })
    }

    /// Fetch the remote's files and write them under `root_dir`
    pub fn pull(
        &self,
        remote: &dyn RemoteProject,
        root_dir: &Path,
    ) -> Result<Vec<ProjectFile>, SyncError> {
        let remote_files = remote.fetch_files()?;
        let written = self.write_project_files(&remote_files, root_dir)?;
        tracing::info!(files = written.len(), root = %root_dir.display(), "pulled");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RemoteFile, RemoteType};
    use std::fs;
    use tempfile::TempDir;

    /// Remote kept in memory, counting replace calls
    #[derive(Default)]
    struct MemoryRemote {
        files: Vec<RemoteFile>,
        replace_calls: usize,
    }

    impl RemoteProject for MemoryRemote {
        fn fetch_files(&self) -> Result<Vec<RemoteFile>, SyncError> {
            Ok(self.files.clone())
        }

        fn replace_files(&mut self, files: &[RemoteFile]) -> Result<(), SyncError> {
            self.files = files.to_vec();
            self.replace_calls += 1;
            Ok(())
        }
    }

    fn engine(lines: &[&str]) -> SyncEngine {
        SyncEngine::new(
            IgnoreMatcher::compile(lines.iter().copied()),
            FileClassifier::default(),
        )
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_push_sends_manifest_then_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "appsscript.json", "{}");
        write(temp.path(), "A.js", "a");
        write(temp.path(), "B.js", "b");
        write(temp.path(), "C.html", "<c/>");

        let engine = engine(&[]).with_push_order(Some(vec!["B".to_string()]));
        let mut remote = MemoryRemote::default();
        let report = engine.push(temp.path(), &mut remote).unwrap();

        let names: Vec<_> = remote.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["appsscript", "B", "A", "C"]);
        assert_eq!(remote.files[3].remote_type, RemoteType::Html);
        assert_eq!(remote.files[1].source, "b");
        assert_eq!(remote.replace_calls, 1);
        assert_eq!(report.pushed.len(), 4);
    }

    #[test]
    fn test_push_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "appsscript.json", "{}");
        for i in 0..20 {
            write(temp.path(), &format!("lib/f{i}.js"), &format!("// {i}"));
        }

        let engine = engine(&[]).with_max_concurrent_reads(3);
        let mut first = MemoryRemote::default();
        let mut second = MemoryRemote::default();

        let a = engine.push(temp.path(), &mut first).unwrap();
        let b = engine.push(temp.path(), &mut second).unwrap();

        assert_eq!(first.files, second.files);
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn test_push_without_manifest_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Code.js", "x");

        let mut remote = MemoryRemote::default();
        let result = engine(&[]).push(temp.path(), &mut remote);

        match result {
            Err(SyncError::ManifestMissing { path }) => {
                assert_eq!(path, temp.path().join("appsscript.json"))
            }
            other => panic!("expected missing manifest, got {other:?}"),
        }
        assert_eq!(remote.replace_calls, 0);
    }

    #[test]
    fn test_ambiguous_project_never_reaches_remote() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "appsscript.json", "{}");
        write(temp.path(), "Code.js", "1");
        write(temp.path(), "Code.gs", "2");

        let mut remote = MemoryRemote::default();
        let result = engine(&[]).push(temp.path(), &mut remote);

        assert!(matches!(result, Err(SyncError::Ambiguous { .. })));
        assert_eq!(remote.replace_calls, 0);
        assert!(engine(&[]).collect_local_files(temp.path()).is_err());
    }

    #[test]
    fn test_untracked_paths_are_joined_onto_root() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "appsscript.json", "{}");
        write(temp.path(), "notes.txt", "");
        write(temp.path(), "Draft.js", "");

        let untracked = engine(&["Draft.js"]).get_untracked_files(temp.path()).unwrap();

        assert_eq!(
            untracked,
            vec![temp.path().join("Draft.js"), temp.path().join("notes.txt")]
        );
    }

    #[test]
    fn test_pull_then_push_round_trips() {
        let temp = TempDir::new().unwrap();
        let files = vec![
            RemoteFile::new("appsscript", RemoteType::Json, "{}"),
            RemoteFile::new("lib.Util", RemoteType::ServerJs, "util()"),
            RemoteFile::new("Page", RemoteType::Html, "<p/>"),
        ];
        let mut remote = MemoryRemote {
            files: files.clone(),
            replace_calls: 0,
        };

        let engine = engine(&[]).with_push_order(Some(vec![
            "lib.Util".to_string(),
            "Page".to_string(),
        ]));
        engine.pull(&remote, temp.path()).unwrap();
        engine.push(temp.path(), &mut remote).unwrap();

        assert_eq!(remote.files, files);
    }
}
