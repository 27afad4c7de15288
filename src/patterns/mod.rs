//! Ignore-file pattern matching
//!
//! A gitignore-compatible subset: ordered rules, `!` negation, `/` anchoring,
//! trailing-`/` directory rules, `*`, `?` and `**` wildcards. A directory
//! pruned by a non-negated directory rule takes its whole subtree with it.

mod matcher;
mod rule;

pub use matcher::{IgnoreMatcher, MatchSession};
pub use rule::{IgnoreRule, PatternError};
