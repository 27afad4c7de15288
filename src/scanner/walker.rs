//! Project tree walker

use crate::classify::FileClassifier;
use crate::patterns::{IgnoreMatcher, MatchSession};
use crate::types::{ProjectFile, ProjectScan, RemoteType, SyncError, UntrackedReason};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Callback for reporting scan progress
///
/// Arguments:
/// - `files_seen`: Total number of files discovered so far
pub type ProgressCallback = Box<dyn Fn(u64) + Send + Sync>;

/// Walk a project root and tag every file tracked or ignored
///
/// Walks the directory tree recursively using the `ignore` crate with its
/// standard filters turned off; only the project's own ignore rules apply.
/// Entries are visited depth-first in file-name order, which is the natural
/// discovery order push relies on.
///
/// # Arguments
/// * `root_path` - The project root
/// * `matcher` - Compiled ignore rules, relative to `root_path`
/// * `classifier` - Path to remote name/type mapping
/// * `on_progress` - Optional callback for progress updates
///
/// # Behavior
/// * A directory whose ignore decision is "ignored" is pruned with its subtree
/// * `is_ignored` = matched by a rule OR rejected by the classifier
/// * The root manifest is always tracked
/// * Unreadable entries are logged and skipped
///
/// # Errors
/// * `SyncError::Config` when `root_path` is not a directory
pub fn scan_project(
    root_path: &Path,
    matcher: &IgnoreMatcher,
    classifier: &FileClassifier,
    on_progress: Option<&ProgressCallback>,
) -> Result<ProjectScan, SyncError> {
    if !root_path.is_dir() {
        return Err(SyncError::Config(format!(
            "Project root is not a directory: {}",
            root_path.display()
        )));
    }

    let start_time = Instant::now();
    let mut scan = ProjectScan::new(root_path.to_path_buf());
    let session = Arc::new(MatchSession::new(Arc::new(matcher.clone())));
    let pruned = Arc::new(AtomicUsize::new(0));

    let walker = {
        let session = Arc::clone(&session);
        let pruned = Arc::clone(&pruned);
        let root = root_path.to_path_buf();

        ignore::WalkBuilder::new(root_path)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                let Ok(relative) = entry.path().strip_prefix(&root) else {
                    return true;
                };
                if session.is_pruned(relative) {
                    tracing::debug!(dir = %relative.display(), "pruned by ignore rules");
                    pruned.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                true
            })
            .build()
    };

    let mut files_seen: u64 = 0;

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("error during directory traversal, skipping entry: {}", e);
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        if file_type.is_dir() {
            continue;
        }

        // Special files (pipes, sockets, dangling links) never belong to a project
        if !file_type.is_file() && !(file_type.is_symlink() && entry.path().is_file()) {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
            continue;
        }

        let relative_path = match entry.path().strip_prefix(root_path) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                tracing::warn!(
                    path = %entry.path().display(),
                    "entry outside the project root, skipping"
                );
                continue;
            }
        };

        let file = tag_file(&relative_path, &session, classifier);
        tracing::debug!(
            path = %relative_path.display(),
            name = %file.local_name,
            ignored = file.is_ignored,
            "classified"
        );
        scan.push(file);

        files_seen += 1;
        if let Some(callback) = on_progress {
            callback(files_seen);
        }
    }

    scan.pruned_dirs = pruned.load(Ordering::Relaxed);
    scan.set_scan_duration(start_time.elapsed());

    Ok(scan)
}

fn tag_file(relative_path: &Path, session: &MatchSession, classifier: &FileClassifier) -> ProjectFile {
    if classifier.is_manifest_path(relative_path) {
        return ProjectFile::tracked(
            relative_path.to_path_buf(),
            classifier.manifest_name().to_string(),
            RemoteType::Json,
        );
    }

    let classification = classifier.classify(relative_path);

    if session.is_ignored(relative_path, false) {
        return ProjectFile::untracked(
            relative_path.to_path_buf(),
            classification.local_name,
            classification.remote_type,
            UntrackedReason::IgnoreRule,
        );
    }

    match (classification.rejection, classification.remote_type) {
        (None, Some(remote_type)) => ProjectFile::tracked(
            relative_path.to_path_buf(),
            classification.local_name,
            remote_type,
        ),
        (reason, _) => ProjectFile::untracked(
            relative_path.to_path_buf(),
            classification.local_name,
            None,
            reason.unwrap_or(UntrackedReason::UnsupportedExtension),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicU64;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create dirs");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    fn scan(root: &Path, rules: &[&str]) -> ProjectScan {
        let matcher = IgnoreMatcher::compile(rules.iter().copied());
        scan_project(root, &matcher, &FileClassifier::default(), None)
            .expect("scan_project should succeed")
    }

    fn tracked_paths(scan: &ProjectScan) -> Vec<PathBuf> {
        scan.tracked().map(|f| f.relative_path.clone()).collect()
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = scan(temp_dir.path(), &[]);

        assert!(result.is_empty());
        assert_eq!(result.root_path, temp_dir.path());
    }

    #[test]
    fn test_scan_missing_root_is_config_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("nope");

        let result = scan_project(
            &missing,
            &IgnoreMatcher::empty(),
            &FileClassifier::default(),
            None,
        );
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_scan_classifies_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write(root, "appsscript.json", "{}");
        write(root, "Code.js", "");
        write(root, "views/Index.html", "");
        write(root, "README.md", "");

        let result = scan(root, &[]);

        let code = result.get(Path::new("Code.js")).expect("Code.js scanned");
        assert_eq!(code.remote_type, Some(RemoteType::ServerJs));
        assert!(!code.is_ignored);

        let index = result
            .get(Path::new("views/Index.html"))
            .expect("Index.html scanned");
        assert_eq!(index.local_name, "views.Index");

        let readme = result.get(Path::new("README.md")).expect("README scanned");
        assert!(readme.is_ignored);
        assert_eq!(
            readme.untracked_reason,
            Some(UntrackedReason::UnsupportedExtension)
        );
    }

    #[test]
    fn test_discovery_order_is_sorted_depth_first() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        for name in ["c.js", "a/z.js", "a/b.js", "b.js"] {
            write(root, name, "");
        }

        let result = scan(root, &[]);
        assert_eq!(
            tracked_paths(&result),
            vec![
                PathBuf::from("a/b.js"),
                PathBuf::from("a/z.js"),
                PathBuf::from("b.js"),
                PathBuf::from("c.js"),
            ]
        );
    }

    #[test]
    fn test_pruned_directory_is_not_descended() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write(root, "node_modules/pkg/index.js", "");
        write(root, "Code.js", "");

        let result = scan(root, &["node_modules/"]);

        assert_eq!(tracked_paths(&result), vec![PathBuf::from("Code.js")]);
        assert!(result.get(Path::new("node_modules/pkg/index.js")).is_none());
        assert_eq!(result.pruned_dirs, 1);
    }

    #[test]
    fn test_manifest_is_force_included() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write(root, "appsscript.json", "{}");
        write(root, "Code.js", "");

        let result = scan(root, &["*"]);

        assert_eq!(tracked_paths(&result), vec![PathBuf::from("appsscript.json")]);
        assert!(result.get(Path::new("Code.js")).expect("scanned").is_ignored);
    }

    #[test]
    fn test_ignored_file_keeps_rule_reason() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write(root, "Draft.js", "");

        let result = scan(root, &["Draft.js"]);
        let draft = result.get(Path::new("Draft.js")).expect("scanned");
        assert_eq!(draft.untracked_reason, Some(UntrackedReason::IgnoreRule));
        assert_eq!(draft.remote_type, Some(RemoteType::ServerJs));
    }

    #[test]
    fn test_scan_progress_callback() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        for i in 1..=4 {
            write(root, &format!("file{i}.js"), "");
        }

        let calls = Arc::new(AtomicU64::new(0));
        let callback: ProgressCallback = {
            let calls = Arc::clone(&calls);
            Box::new(move |files| {
                calls.fetch_add(1, Ordering::SeqCst);
                assert!(files > 0, "File count should be positive");
            })
        };

        let result = scan_project(
            root,
            &IgnoreMatcher::empty(),
            &FileClassifier::default(),
            Some(&callback),
        )
        .expect("scan_project should succeed");

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.len(), 4);
    }

    #[test]
    #[cfg(unix)]
    fn test_dangling_symlink_is_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        std::os::unix::fs::symlink(root.join("missing.js"), root.join("link.js"))
            .expect("Failed to create symlink");

        let result = scan(root, &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_unmapped_extensions_are_walked_but_untracked() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write(root, "appsscript.json", "{}");
        write(root, "Code.ts", "");
        write(root, "lib/settings.json", "{}");

        let result = scan(root, &[]);

        assert_eq!(tracked_paths(&result), vec![PathBuf::from("appsscript.json")]);
        let code = result.get(Path::new("Code.ts")).expect("Code.ts scanned");
        assert_eq!(code.remote_type, None);
        assert_eq!(code.untracked_reason, Some(UntrackedReason::UnsupportedExtension));
        let settings = result
            .get(Path::new("lib/settings.json"))
            .expect("settings.json scanned");
        assert_eq!(settings.untracked_reason, Some(UntrackedReason::StrayJson));
    }
}
