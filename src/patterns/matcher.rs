//! IgnoreMatcher - Compiled ignore rules and the per-walk decision cache

use super::rule::{IgnoreRule, PatternError};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: IgnoreRule,
    glob: GlobMatcher,
    /// `foo/**` also names the directory `foo` itself
    stem: Option<GlobMatcher>,
}

impl CompiledRule {
    fn compile(rule: IgnoreRule) -> Result<Self, globset::Error> {
        let source = rule.glob_source();
        let glob = build_glob(&source)?;
        let stem = match source.strip_suffix("/**") {
            Some(stem) if !stem.is_empty() => Some(build_glob(stem)?),
            _ => None,
        };
        Ok(Self { rule, glob, stem })
    }

    fn matches_file(&self, path: &Path) -> bool {
        !self.rule.dir_only && self.glob.is_match(path)
    }

    fn matches_dir(&self, path: &Path) -> bool {
        if !self.rule.prunes_directories() {
            return false;
        }
        self.glob.is_match(path)
            || self.stem.as_ref().is_some_and(|stem| stem.is_match(path))
    }
}

fn build_glob(source: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(source)
        .literal_separator(true)
        .backslash_escape(true)
        .build()?
        .compile_matcher())
}

/// Ignore rules compiled from the lines of one ignore file
///
/// Rules are evaluated in file order and the last matching rule decides.
/// Malformed lines are dropped and recorded in [`IgnoreMatcher::errors`].
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<CompiledRule>,
    errors: Vec<PatternError>,
}

impl IgnoreMatcher {
    /// Compile ignore-file lines
    pub fn compile<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let line_number = index + 1;

            let parsed = IgnoreRule::parse(line, line_number).and_then(|rule| match rule {
                Some(rule) => CompiledRule::compile(rule)
                    .map(Some)
                    .map_err(|e| PatternError {
                        line_number,
                        line: line.to_string(),
                        message: e.kind().to_string(),
                    }),
                None => Ok(None),
            });

            match parsed {
                Ok(Some(rule)) => matcher.rules.push(rule),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        line = err.line_number,
                        pattern = %err.line,
                        "skipping malformed ignore pattern: {}",
                        err.message
                    );
                    matcher.errors.push(err);
                }
            }
        }

        matcher
    }

    /// Matcher with no rules; ignores nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parsed rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Lines that failed to compile
    pub fn errors(&self) -> &[PatternError] {
        &self.errors
    }

    /// Decide whether a root-relative path is ignored.
    ///
    /// A path below a pruned directory is always ignored. Use a
    /// [`MatchSession`] to memoise directory decisions across many lookups.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let pruned_ancestor = path
            .ancestors()
            .skip(1)
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .any(|ancestor| self.directory_decision(ancestor));

        if pruned_ancestor {
            return true;
        }

        if is_dir {
            self.directory_decision(path)
        } else {
            self.file_decision(path)
        }
    }

    /// Last matching directory rule decides; `true` prunes the directory.
    fn directory_decision(&self, dir: &Path) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|compiled| compiled.matches_dir(dir))
            .is_some_and(|compiled| !compiled.rule.negated)
    }

    /// Last matching file rule decides; `true` ignores the file.
    fn file_decision(&self, file: &Path) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|compiled| compiled.matches_file(file))
            .is_some_and(|compiled| !compiled.rule.negated)
    }
}

/// Directory decisions memoised for the lifetime of one walk
#[derive(Debug)]
pub struct MatchSession {
    matcher: Arc<IgnoreMatcher>,
    pruned: Mutex<HashMap<PathBuf, bool>>,
}

impl MatchSession {
    pub fn new(matcher: Arc<IgnoreMatcher>) -> Self {
        Self {
            matcher,
            pruned: Mutex::new(HashMap::new()),
        }
    }

    pub fn matcher(&self) -> &IgnoreMatcher {
        &self.matcher
    }

    /// Whether `dir` (or one of its ancestors) is pruned.
    pub fn is_pruned(&self, dir: &Path) -> bool {
        if dir.as_os_str().is_empty() {
            return false;
        }

        if let Some(&cached) = self.lock().get(dir) {
            return cached;
        }

        let parent_pruned = dir.parent().is_some_and(|parent| self.is_pruned(parent));
        let pruned = parent_pruned || self.matcher.directory_decision(dir);

        self.lock().insert(dir.to_path_buf(), pruned);
        pruned
    }

    /// Same answer as [`IgnoreMatcher::is_ignored`], with cached ancestors
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if is_dir {
            return self.is_pruned(path);
        }

        let parent_pruned = path.parent().is_some_and(|parent| self.is_pruned(parent));
        parent_pruned || self.matcher.file_decision(path)
    }

    /// Number of directories decided so far
    pub fn cached_directories(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, bool>> {
        self.pruned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
