//! Command implementations

mod pull;
mod push;
mod status;

pub use pull::run_pull;
pub use push::run_push;
pub use status::{run_status, StatusReport};

use crate::config::{Cli, Commands, ProjectContext};
use crate::sync::SyncEngine;
use crate::types::SyncError;
use crate::ui::ProgressReporter;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Resolve the project and run the selected command
pub fn run(cli: Cli, cwd: &Path) -> Result<(), SyncError> {
    let context = ProjectContext::resolve(cli.project.as_deref(), cwd)?;
    tracing::debug!(
        config_dir = %context.config_dir.display(),
        root = %context.root_dir.display(),
        "project resolved"
    );

    match cli.command {
        Commands::Status { json } => run_status(&context, json),
        Commands::Push { dry_run, to } => run_push(&context, dry_run, to.as_deref()),
        Commands::Pull { from } => run_pull(&context, from.as_deref()),
    }
}

/// Engine wired to a spinner that counts walked files
fn engine_with_progress(context: &ProjectContext, reporter: &Arc<ProgressReporter>) -> SyncEngine {
    let label = context.root_dir.display().to_string();
    reporter.start_scan(&label);

    let reporter = Arc::clone(reporter);
    context
        .engine()
        .with_progress(Box::new(move |files| reporter.update_scan(&label, files)))
}

/// Plain-English message for an error, with a suggestion when one helps
pub fn describe_error(error: &SyncError) -> String {
    let (message, suggestion) = humanize_error(error);
    let mut lines = vec![format!("{}: {}", error_kind_label(error), message)];
    if let Some(path) = error.path() {
        lines.push(format!("  Path: {}", path.display()));
    }
    if let Some(suggestion) = suggestion {
        lines.push(format!("  Try: {}", suggestion));
    }
    if error.is_preflight_error() {
        lines.push("  Nothing was written.".to_string());
    }
    lines.join("\n")
}

/// Process exit code for an error
pub fn exit_code(error: &SyncError) -> i32 {
    if error.is_config_error() {
        2
    } else {
        1
    }
}

fn humanize_error(error: &SyncError) -> (String, Option<String>) {
    match error {
        SyncError::Io(io) | SyncError::Write { source: io, .. } | SyncError::Read { source: io, .. } => {
            match io.kind() {
                ErrorKind::NotFound => (
                    "File or directory was not found".to_string(),
                    Some("Verify the path still exists and retry.".to_string()),
                ),
                ErrorKind::PermissionDenied => (
                    "Permission denied while accessing file".to_string(),
                    Some("Check file permissions or run with a user that has access.".to_string()),
                ),
                ErrorKind::AlreadyExists => (
                    "A file already exists where a directory is needed".to_string(),
                    Some("Remove or rename the conflicting path, then retry.".to_string()),
                ),
                ErrorKind::InvalidData => (
                    "File is not valid UTF-8 text".to_string(),
                    Some("Add the file to the ignore file if it is not a script.".to_string()),
                ),
                _ => (format!("I/O operation failed: {}", io), None),
            }
        }
        SyncError::Config(msg) => (msg.clone(), None),
        SyncError::Ambiguous { collisions } => {
            let listed: Vec<String> = collisions.iter().map(|c| format!("\n    {c}")).collect();
            (
                format!(
                    "{} remote name(s) claimed by more than one local file:{}",
                    collisions.len(),
                    listed.concat()
                ),
                Some("Rename or ignore all but one file per name.".to_string()),
            )
        }
        SyncError::InvalidRemoteName { name } => (
            format!("Remote file {name:?} cannot be written inside the project root"),
            Some("Rename the file on the remote, then pull again.".to_string()),
        ),
        SyncError::ManifestMissing { .. } => (
            "The project manifest is not tracked".to_string(),
            Some("Create the manifest or remove the ignore rule that hides it.".to_string()),
        ),
        SyncError::Remote(msg) => (msg.clone(), None),
        SyncError::Snapshot(e) => (
            format!("Remote snapshot is not valid JSON: {e}"),
            Some("Push again to rewrite the snapshot.".to_string()),
        ),
    }
}

fn error_kind_label(error: &SyncError) -> &'static str {
    match error {
        SyncError::Io(_) => "I/O error",
        SyncError::Config(_) => "Configuration error",
        SyncError::Ambiguous { .. } => "Ambiguous project",
        SyncError::Write { .. } => "Write failed",
        SyncError::Read { .. } => "Read failed",
        SyncError::InvalidRemoteName { .. } => "Invalid remote name",
        SyncError::ManifestMissing { .. } => "Manifest missing",
        SyncError::Remote(_) => "Remote error",
        SyncError::Snapshot(_) => "Snapshot error",
    }
}
