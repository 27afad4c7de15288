//! `status`: list what a push would track

use super::engine_with_progress;
use crate::config::ProjectContext;
use crate::sync::check_collisions;
use crate::types::{NameCollision, ProjectScan, RemoteType, SyncError, UntrackedReason};
use crate::ui::ProgressReporter;
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Machine-readable status, printed by `status --json`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub root: PathBuf,
    pub tracked: Vec<TrackedEntry>,
    pub untracked: Vec<UntrackedEntry>,
    pub collisions: Vec<String>,
    pub pattern_errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedEntry {
    pub path: PathBuf,
    pub name: String,
    #[serde(rename = "type")]
    pub remote_type: RemoteType,
}

#[derive(Debug, Clone, Serialize)]
pub struct UntrackedEntry {
    pub path: PathBuf,
    pub reason: Option<UntrackedReason>,
}

impl StatusReport {
    /// Build a report from a finished walk; paths are joined onto `root`
    pub fn from_scan(root: &Path, scan: &ProjectScan, pattern_errors: Vec<String>) -> Self {
        let tracked: Vec<TrackedEntry> = scan
            .tracked()
            .filter_map(|file| {
                file.remote_type.map(|remote_type| TrackedEntry {
                    path: file.path_from(root),
                    name: file.local_name.clone(),
                    remote_type,
                })
            })
            .collect();

        let untracked = scan
            .untracked()
            .map(|file| UntrackedEntry {
                path: file.path_from(root),
                reason: file.untracked_reason,
            })
            .collect();

        let tracked_files: Vec<_> = scan.tracked().cloned().collect();
        let collisions = match check_collisions(&tracked_files) {
            Err(SyncError::Ambiguous { collisions }) => {
                collisions.iter().map(NameCollision::to_string).collect()
            }
            _ => Vec::new(),
        };

        Self {
            root: root.to_path_buf(),
            tracked,
            untracked,
            collisions,
            pattern_errors,
        }
    }

    /// Human-readable rendering
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} {}",
            style("Project root:").bold(),
            self.root.display()
        ));

        lines.push(format!(
            "\n{} ({}):",
            style("Tracked").green().bold(),
            self.tracked.len()
        ));
        if self.tracked.is_empty() {
            lines.push("  (none)".to_string());
        }
        for entry in &self.tracked {
            lines.push(format!(
                "  {:<10} {:<24} {}",
                entry.remote_type.as_str(),
                entry.name,
                style(entry.path.display()).dim()
            ));
        }

        if !self.untracked.is_empty() {
            lines.push(format!(
                "\n{} ({}):",
                style("Untracked").yellow().bold(),
                self.untracked.len()
            ));
            for entry in &self.untracked {
                let reason = entry
                    .reason
                    .map(|reason| reason.to_string())
                    .unwrap_or_default();
                lines.push(format!("  {}  {}", entry.path.display(), style(reason).dim()));
            }
        }

        if !self.collisions.is_empty() {
            lines.push(format!(
                "\n{} push will refuse these names:",
                style("Ambiguous:").red().bold()
            ));
            for collision in &self.collisions {
                lines.push(format!("  {}", collision));
            }
        }

        for error in &self.pattern_errors {
            lines.push(format!("{} {}", style("warning:").yellow(), error));
        }

        lines.join("\n")
    }
}

pub fn run_status(context: &ProjectContext, json: bool) -> Result<(), SyncError> {
    let reporter = Arc::new(if json {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    });
    let engine = engine_with_progress(context, &reporter);
    let scan = engine.scan(&context.root_dir)?;
    reporter.finish_scan(
        &context.root_dir.display().to_string(),
        scan.tracked().count(),
        scan.untracked().count(),
    );
    reporter.finish();

    let pattern_errors = engine
        .matcher()
        .errors()
        .iter()
        .map(ToString::to_string)
        .collect();
    let report = StatusReport::from_scan(&context.root_dir, &scan, pattern_errors);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }
    Ok(())
}
