//! File classification: local path <-> remote name and type

use crate::types::{ProjectFile, RemoteFile, RemoteType, SyncError, UntrackedReason};
use camino::{Utf8Component, Utf8Path};
use std::path::{Path, PathBuf};

/// Default manifest basename
pub const DEFAULT_MANIFEST: &str = "appsscript.json";

/// Outcome of classifying one root-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Remote kind when the path maps onto one
    pub remote_type: Option<RemoteType>,

    /// Remote name derived from the path
    pub local_name: String,

    /// Set when the file can never be pushed
    pub rejection: Option<UntrackedReason>,
}

impl Classification {
    fn valid(remote_type: RemoteType, local_name: String) -> Self {
        Self {
            remote_type: Some(remote_type),
            local_name,
            rejection: None,
        }
    }

    fn invalid(reason: UntrackedReason, local_name: String) -> Self {
        Self {
            remote_type: None,
            local_name,
            rejection: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Maps local paths to remote names and types, and back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassifier {
    manifest: String,
    script_extensions: Vec<String>,
    html_extensions: Vec<String>,
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_MANIFEST,
            &[".js".to_string(), ".gs".to_string()],
            &[".html".to_string()],
        )
    }
}

impl FileClassifier {
    /// Build a classifier.
    ///
    /// Extensions are accepted with or without the leading dot and compared
    /// case-insensitively. The first extension of each list is the one pull
    /// writes.
    pub fn new(manifest: &str, script_extensions: &[String], html_extensions: &[String]) -> Self {
        Self {
            manifest: manifest.to_string(),
            script_extensions: normalize_extensions(script_extensions),
            html_extensions: normalize_extensions(html_extensions),
        }
    }

    /// Manifest basename, e.g. `appsscript.json`
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Remote name of the manifest (its basename without extension)
    pub fn manifest_name(&self) -> &str {
        Path::new(&self.manifest)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.manifest)
    }

    pub fn script_extensions(&self) -> &[String] {
        &self.script_extensions
    }

    pub fn html_extensions(&self) -> &[String] {
        &self.html_extensions
    }

    /// True when `relative_path` is the manifest at the project root
    pub fn is_manifest_path(&self, relative_path: &Path) -> bool {
        let mut components = relative_path.components();
        matches!(
            (components.next(), components.next()),
            (Some(std::path::Component::Normal(name)), None) if name == self.manifest.as_str()
        )
    }

    /// Classify a path relative to the project root
    pub fn classify(&self, relative_path: &Path) -> Classification {
        if is_types_definition(relative_path) {
            return Classification::invalid(
                UntrackedReason::TypesDefinition,
                lossy_name(relative_path),
            );
        }

        let Some(local_name) = remote_name(relative_path) else {
            return Classification::invalid(
                UntrackedReason::UnmappableName,
                lossy_name(relative_path),
            );
        };

        if self.is_manifest_path(relative_path) {
            return Classification::valid(RemoteType::Json, self.manifest_name().to_string());
        }

        let extension = relative_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if self.script_extensions.contains(&extension) {
            Classification::valid(RemoteType::ServerJs, local_name)
        } else if self.html_extensions.contains(&extension) {
            Classification::valid(RemoteType::Html, local_name)
        } else if extension == "json" {
            Classification::invalid(UntrackedReason::StrayJson, local_name)
        } else {
            Classification::invalid(UntrackedReason::UnsupportedExtension, local_name)
        }
    }

    /// Classify a path that starts with `root_dir`
    pub fn classify_path(&self, path: &Path, root_dir: &Path) -> Classification {
        match path.strip_prefix(root_dir) {
            Ok(relative) => self.classify(relative),
            Err(_) => Classification::invalid(UntrackedReason::UnmappableName, lossy_name(path)),
        }
    }

    /// Extension pull writes for a remote type (without the dot)
    pub fn extension_for(&self, remote_type: RemoteType) -> &str {
        match remote_type {
            RemoteType::ServerJs => self
                .script_extensions
                .first()
                .map(String::as_str)
                .unwrap_or("js"),
            RemoteType::Html => self
                .html_extensions
                .first()
                .map(String::as_str)
                .unwrap_or("html"),
            RemoteType::Json => "json",
        }
    }

    /// Root-relative path a remote file is written to.
    ///
    /// JSON always maps to the manifest at the root. Other names are split on
    /// `.`: leading segments become directories, the last one the file stem.
    pub fn reverse_map(&self, name: &str, remote_type: RemoteType) -> Result<PathBuf, SyncError> {
        if remote_type == RemoteType::Json {
            return Ok(PathBuf::from(&self.manifest));
        }

        let segments: Vec<&str> = name.split('.').collect();
        let unsafe_segment = segments
            .iter()
            .any(|segment| segment.is_empty() || segment.contains(['/', '\\']));
        if unsafe_segment {
            return Err(SyncError::InvalidRemoteName {
                name: name.to_string(),
            });
        }

        let (file_stem, dirs) = segments
            .split_last()
            .ok_or_else(|| SyncError::InvalidRemoteName {
                name: name.to_string(),
            })?;

        let mut path: PathBuf = dirs.iter().collect();
        path.push(format!("{}.{}", file_stem, self.extension_for(remote_type)));
        Ok(path)
    }

    /// Local file for a remote file, content attached
    pub fn to_project_file(&self, remote: &RemoteFile) -> Result<ProjectFile, SyncError> {
        let relative_path = self.reverse_map(&remote.name, remote.remote_type)?;
        let local_name = self.classify(&relative_path).local_name;
        Ok(
            ProjectFile::tracked(relative_path, local_name, remote.remote_type)
                .with_content(remote.source.clone()),
        )
    }
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn is_types_definition(relative_path: &Path) -> bool {
    let components: Vec<_> = relative_path.components().collect();
    components
        .windows(2)
        .any(|pair| pair[0].as_os_str() == "node_modules" && pair[1].as_os_str() == "@types")
}

/// `foo/Code.js` -> `foo.Code`; `None` when the name could not map back.
fn remote_name(relative_path: &Path) -> Option<String> {
    let utf8 = Utf8Path::from_path(relative_path)?;
    let mut segments = Vec::new();

    for component in utf8.components() {
        match component {
            Utf8Component::Normal(segment) => segments.push(segment),
            _ => return None,
        }
    }

    let file_stem = utf8.file_stem()?;
    let last = segments.last_mut()?;
    *last = file_stem;

    let name = segments.join(".");
    if name.split('.').any(str::is_empty) {
        return None;
    }
    Some(name)
}

fn lossy_name(path: &Path) -> String {
    path.with_extension("")
        .to_string_lossy()
        .replace(['/', '\\'], ".")
}
