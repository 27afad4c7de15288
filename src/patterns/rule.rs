//! IgnoreRule - One parsed line of an ignore file

use thiserror::Error;

/// A malformed ignore line. Never fatal: the line simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ignore line {line_number}: {message} ({line:?})")]
pub struct PatternError {
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// A parsed ignore line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// Pattern text with the `!` prefix, leading `/` and trailing `/` removed
    pub pattern: String,

    /// `!`-prefixed line: re-includes what earlier rules ignored
    pub negated: bool,

    /// Trailing `/`: applies to directories only
    pub dir_only: bool,

    /// Leading or embedded `/`: relative to the project root
    pub anchored: bool,

    /// 1-based line number in the ignore file
    pub line_number: usize,
}

impl IgnoreRule {
    /// Parse one ignore-file line.
    ///
    /// Returns `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str, line_number: usize) -> Result<Option<Self>, PatternError> {
        let text = trim_unescaped_end(line);
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let (negated, rest) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let dir_only = rest.ends_with('/');
        let rest = rest.trim_end_matches('/');
        let leading_slash = rest.starts_with('/');
        let rest = rest.trim_start_matches('/');

        if rest.is_empty() {
            return Err(PatternError {
                line_number,
                line: line.to_string(),
                message: "empty pattern".to_string(),
            });
        }

        Ok(Some(Self {
            pattern: rest.to_string(),
            negated,
            dir_only,
            anchored: leading_slash || rest.contains('/'),
            line_number,
        }))
    }

    /// Glob source handed to `globset`
    pub fn glob_source(&self) -> String {
        if self.anchored {
            self.pattern.clone()
        } else {
            format!("**/{}", self.pattern)
        }
    }

    /// Every segment is made of `*` and `?` only (`**/**`, `*`)
    pub fn is_pure_wildcard(&self) -> bool {
        self.pattern
            .split('/')
            .all(|segment| !segment.is_empty() && segment.chars().all(|c| c == '*' || c == '?'))
    }

    /// Rules that can prune a whole directory: explicit directory rules and
    /// rules naming at least one literal segment.
    pub fn prunes_directories(&self) -> bool {
        self.dir_only || !self.is_pure_wildcard()
    }
}

/// Trim trailing whitespace, keeping one space escaped by a trailing `\`
fn trim_unescaped_end(line: &str) -> &str {
    let trimmed = line.trim_end();
    let backslashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    if backslashes % 2 == 1 && line[trimmed.len()..].starts_with(' ') {
        &line[..trimmed.len() + 1]
    } else {
        trimmed
    }
}
