//! ProjectFile and RemoteFile - The local and server views of one project file

use super::RemoteType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a local file is left out of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntrackedReason {
    /// Matched by the ignore file
    IgnoreRule,

    /// Lives under `node_modules/@types/`
    TypesDefinition,

    /// Extension maps to no remote type
    UnsupportedExtension,

    /// JSON file other than the root manifest
    StrayJson,

    /// Name cannot be mapped back to the same path (empty segment, non-UTF-8)
    UnmappableName,
}

impl fmt::Display for UntrackedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UntrackedReason::IgnoreRule => "ignored",
            UntrackedReason::TypesDefinition => "type definitions",
            UntrackedReason::UnsupportedExtension => "unsupported extension",
            UntrackedReason::StrayJson => "not the manifest",
            UntrackedReason::UnmappableName => "unmappable name",
        };
        f.write_str(label)
    }
}

/// A local file belonging (or not) to the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Path relative to the project root
    pub relative_path: PathBuf,

    /// Remote name derived from `relative_path`
    pub local_name: String,

    /// Remote kind; `None` when no remote type fits
    pub remote_type: Option<RemoteType>,

    /// File source, attached right before upload or after a pull
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub is_ignored: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub untracked_reason: Option<UntrackedReason>,
}

impl ProjectFile {
    /// Create a tracked file
    pub fn tracked(relative_path: PathBuf, local_name: String, remote_type: RemoteType) -> Self {
        Self {
            relative_path,
            local_name,
            remote_type: Some(remote_type),
            content: None,
            is_ignored: false,
            untracked_reason: None,
        }
    }

    /// Create a file that stays out of pushes
    pub fn untracked(
        relative_path: PathBuf,
        local_name: String,
        remote_type: Option<RemoteType>,
        reason: UntrackedReason,
    ) -> Self {
        Self {
            relative_path,
            local_name,
            remote_type,
            content: None,
            is_ignored: true,
            untracked_reason: Some(reason),
        }
    }

    /// Attach file content
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    /// True for the project manifest
    pub fn is_manifest(&self) -> bool {
        self.remote_type == Some(RemoteType::Json)
    }

    /// Path of this file as seen from the directory `root` is relative to
    pub fn path_from(&self, root: &Path) -> PathBuf {
        root.join(&self.relative_path)
    }

    /// Remote view of this file; `None` while it has no content or type
    pub fn to_remote_file(&self) -> Option<RemoteFile> {
        Some(RemoteFile {
            name: self.local_name.clone(),
            remote_type: self.remote_type?,
            source: self.content.clone()?,
        })
    }
}

/// A file as stored by the remote project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,

    #[serde(rename = "type")]
    pub remote_type: RemoteType,

    pub source: String,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, remote_type: RemoteType, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_type,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_file() {
        let file = ProjectFile::tracked(
            PathBuf::from("foo/Code.js"),
            "foo.Code".to_string(),
            RemoteType::ServerJs,
        );

        assert!(!file.is_ignored);
        assert!(!file.is_manifest());
        assert_eq!(file.untracked_reason, None);
        assert_eq!(file.content, None);
    }

    #[test]
    fn test_untracked_file() {
        let file = ProjectFile::untracked(
            PathBuf::from("notes.txt"),
            "notes".to_string(),
            None,
            UntrackedReason::UnsupportedExtension,
        );

        assert!(file.is_ignored);
        assert_eq!(file.untracked_reason, Some(UntrackedReason::UnsupportedExtension));
    }

    #[test]
    fn test_to_remote_file_requires_content() {
        let file = ProjectFile::tracked(
            PathBuf::from("Page.html"),
            "Page".to_string(),
            RemoteType::Html,
        );
        assert!(file.to_remote_file().is_none());

        let remote = file
            .with_content("<p>hi</p>".to_string())
            .to_remote_file()
            .expect("content attached");
        assert_eq!(remote, RemoteFile::new("Page", RemoteType::Html, "<p>hi</p>"));
    }

    #[test]
    fn test_path_from_keeps_relative_root() {
        let file = ProjectFile::tracked(
            PathBuf::from("build/main.js"),
            "build.main".to_string(),
            RemoteType::ServerJs,
        );
        assert_eq!(
            file.path_from(Path::new("dist")),
            PathBuf::from("dist/build/main.js")
        );
    }

    #[test]
    fn test_remote_file_serializes_type_field() {
        let remote = RemoteFile::new("appsscript", RemoteType::Json, "{}");
        let json = serde_json::to_string(&remote).expect("Failed to serialize");
        assert_eq!(json, r#"{"name":"appsscript","type":"JSON","source":"{}"}"#);

        let back: RemoteFile = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back, remote);
    }
}
