//! Configuration management

mod cli;

pub use cli::{Cli, Commands};

use crate::classify::{FileClassifier, DEFAULT_MANIFEST};
use crate::patterns::IgnoreMatcher;
use crate::sync::{SnapshotRemote, SyncEngine, DEFAULT_MAX_CONCURRENT_READS};
use crate::types::SyncError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Project config file name, searched for upward from the working directory
pub const CONFIG_FILE: &str = ".scriptsync.toml";

/// Default ignore file name, relative to the config directory
pub const DEFAULT_IGNORE_FILE: &str = ".scriptignore";

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST.to_string()
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(DEFAULT_IGNORE_FILE)
}

fn default_max_concurrent_reads() -> usize {
    DEFAULT_MAX_CONCURRENT_READS
}

fn default_script_extensions() -> Vec<String> {
    vec![".js".to_string(), ".gs".to_string()]
}

fn default_html_extensions() -> Vec<String> {
    vec![".html".to_string()]
}

/// File extensions mapped to each remote type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Server script extensions; the first is used when pulling
    #[serde(default = "default_script_extensions")]
    pub script: Vec<String>,

    /// Markup extensions; the first is used when pulling
    #[serde(default = "default_html_extensions")]
    pub html: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            script: default_script_extensions(),
            html: default_html_extensions(),
        }
    }
}

/// Project configuration parsed from `.scriptsync.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote project id, recorded in snapshots
    #[serde(default)]
    pub script_id: Option<String>,

    /// Project root, relative to the config directory
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Files uploaded first, in this order
    #[serde(default)]
    pub file_push_order: Option<Vec<String>>,

    /// Manifest basename
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Ignore file, relative to the config directory
    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,

    /// Remote snapshot file, relative to the config directory
    #[serde(default)]
    pub remote: Option<PathBuf>,

    /// Upper bound on files read at the same time during push
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,

    #[serde(default)]
    pub extensions: ExtensionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_id: None,
            root_dir: default_root_dir(),
            file_push_order: None,
            manifest: default_manifest(),
            ignore_file: default_ignore_file(),
            remote: None,
            max_concurrent_reads: default_max_concurrent_reads(),
            extensions: ExtensionConfig::default(),
        }
    }
}

impl Config {
    /// Parse a config from TOML content
    ///
    /// ```
    /// use scriptsync::config::Config;
    ///
    /// let config = Config::parse(r#"
    /// root_dir = "dist"
    /// file_push_order = ["Polyfills", "Main"]
    ///
    /// [extensions]
    /// script = [".ts"]
    /// "#).unwrap();
    ///
    /// assert_eq!(config.root_dir.to_str(), Some("dist"));
    /// assert_eq!(config.manifest, "appsscript.json");
    /// assert_eq!(config.extensions.html, vec![".html"]);
    /// ```
    pub fn parse(content: &str) -> Result<Self, SyncError> {
        toml::from_str(content).map_err(|e| SyncError::Config(format!("invalid {CONFIG_FILE}: {e}")))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Validate configuration
    pub fn validate(&self, config_dir: &Path) -> Result<(), SyncError> {
        let root = resolve_root(config_dir, &self.root_dir);
        if !root.is_dir() {
            return Err(SyncError::Config(format!(
                "Project root does not exist: {}",
                root.display()
            )));
        }

        let manifest = self.manifest.trim();
        if manifest.is_empty() {
            return Err(SyncError::Config("manifest name cannot be empty".to_string()));
        }
        if manifest.contains(['/', '\\']) {
            return Err(SyncError::Config(format!(
                "manifest must be a file name, not a path: {manifest}"
            )));
        }

        if self.extensions.script.is_empty() {
            return Err(SyncError::Config(
                "extensions.script needs at least one extension".to_string(),
            ));
        }
        if self.extensions.html.is_empty() {
            return Err(SyncError::Config(
                "extensions.html needs at least one extension".to_string(),
            ));
        }

        Ok(())
    }

    pub fn classifier(&self) -> FileClassifier {
        FileClassifier::new(
            self.manifest.trim(),
            &self.extensions.script,
            &self.extensions.html,
        )
    }
}

/// Walk up from `start` to the nearest directory holding [`CONFIG_FILE`]
pub fn discover_config_dir(start: &Path) -> Result<PathBuf, SyncError> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            SyncError::Config(format!(
                "no {} found in {} or any parent directory",
                CONFIG_FILE,
                start.display()
            ))
        })
}

/// Ignore rules used when the project has no ignore file: ignore
/// everything, then re-include the manifest and every mapped extension
pub fn default_ignore_lines(classifier: &FileClassifier) -> Vec<String> {
    let mut lines = vec!["**/**".to_string(), format!("!{}", classifier.manifest())];
    lines.extend(
        classifier
            .script_extensions()
            .iter()
            .chain(classifier.html_extensions())
            .map(|ext| format!("!**/*.{ext}")),
    );
    lines.push(".git/**".to_string());
    lines.push("**/node_modules/**".to_string());
    lines
}

/// A project resolved for one command invocation
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Directory holding `.scriptsync.toml`
    pub config_dir: PathBuf,

    /// Project root files are walked from and pulled into
    pub root_dir: PathBuf,

    pub config: Config,

    /// Raw ignore-file lines, relative to `root_dir`
    pub ignore_lines: Vec<String>,
}

impl ProjectContext {
    /// Resolve the project for `--project DIR`, or search upward from `cwd`.
    ///
    /// An explicit project directory without a config file runs with the
    /// default config.
    pub fn resolve(project: Option<&Path>, cwd: &Path) -> Result<Self, SyncError> {
        let config_dir = match project {
            Some(dir) => {
                let dir = cwd.join(dir);
                if !dir.is_dir() {
                    return Err(SyncError::Config(format!(
                        "Project directory does not exist: {}",
                        dir.display()
                    )));
                }
                dir
            }
            None => discover_config_dir(cwd)?,
        };

        let config_path = config_dir.join(CONFIG_FILE);
        let config = if config_path.is_file() {
            Config::load(&config_path)?
        } else {
            Config::default()
        };

        Self::from_config(config_dir, config)
    }

    /// Validate `config` and read its ignore file
    pub fn from_config(config_dir: PathBuf, config: Config) -> Result<Self, SyncError> {
        config.validate(&config_dir)?;

        let root_dir = resolve_root(&config_dir, &config.root_dir);
        let ignore_path = config_dir.join(&config.ignore_file);
        let ignore_lines = match fs::read_to_string(&ignore_path) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %ignore_path.display(), "no ignore file, using default rules");
                default_ignore_lines(&config.classifier())
            }
            Err(e) => {
                return Err(SyncError::Config(format!(
                    "cannot read ignore file {}: {}",
                    ignore_path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            config_dir,
            root_dir,
            config,
            ignore_lines,
        })
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(
            IgnoreMatcher::compile(&self.ignore_lines),
            self.config.classifier(),
        )
        .with_push_order(self.config.file_push_order.clone())
        .with_max_concurrent_reads(self.config.max_concurrent_reads)
    }

    /// Snapshot remote named on the command line, or else by the config
    pub fn remote(&self, override_path: Option<&Path>) -> Result<SnapshotRemote, SyncError> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| self.config.remote.as_ref().map(|p| self.config_dir.join(p)))
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "no remote configured: pass a snapshot file or set `remote` in {CONFIG_FILE}"
                ))
            })?;
        Ok(SnapshotRemote::new(path).with_script_id(self.config.script_id.clone()))
    }
}

/// Join `root_dir` onto `config_dir`, dropping `.` components
fn resolve_root(config_dir: &Path, root_dir: &Path) -> PathBuf {
    let joined: PathBuf = config_dir
        .join(root_dir)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if joined.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        joined
    }
}
