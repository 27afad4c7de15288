//! Push ordering

use crate::types::ProjectFile;
use std::path::{Component, Path};

/// Order tracked files for upload.
///
/// Files named by `explicit_order` come first, in the order given; the rest
/// follow in discovery order. An entry names a file by its remote name
/// (`lib.Util`) or by its root-relative path written with `/`
/// (`lib/Util.js`). Entries that name nothing are skipped. Ignored files and
/// the manifest never appear in the result.
///
/// # Example
/// ```
/// use scriptsync::order::order_push_files;
/// use scriptsync::types::{ProjectFile, RemoteType};
/// use std::path::PathBuf;
///
/// let files: Vec<ProjectFile> = ["A", "B", "C"]
///     .iter()
///     .map(|n| ProjectFile::tracked(PathBuf::from(format!("{n}.js")), n.to_string(), RemoteType::ServerJs))
///     .collect();
///
/// let order = vec!["B".to_string(), "A".to_string()];
/// let names: Vec<String> = order_push_files(&files, Some(&order))
///     .into_iter()
///     .map(|f| f.local_name)
///     .collect();
/// assert_eq!(names, ["B", "A", "C"]);
/// ```
pub fn order_push_files(files: &[ProjectFile], explicit_order: Option<&[String]>) -> Vec<ProjectFile> {
    let candidates: Vec<&ProjectFile> = files
        .iter()
        .filter(|file| !file.is_ignored && !file.is_manifest())
        .collect();

    let mut emitted = vec![false; candidates.len()];
    let mut ordered = Vec::with_capacity(candidates.len());

    for entry in explicit_order.unwrap_or_default() {
        let entry = entry.trim().trim_start_matches("./");
        let mut named = false;

        for (index, file) in candidates.iter().enumerate() {
            if !names_file(entry, file) {
                continue;
            }
            named = true;
            if !emitted[index] {
                emitted[index] = true;
                ordered.push((*file).clone());
            }
        }

        if !named {
            tracing::debug!(entry, "push order entry matches no tracked file");
        }
    }

    for (index, file) in candidates.into_iter().enumerate() {
        if !emitted[index] {
            ordered.push(file.clone());
        }
    }

    ordered
}

fn names_file(entry: &str, file: &ProjectFile) -> bool {
    !entry.is_empty() && (entry == file.local_name || entry == slash_path(&file.relative_path))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
