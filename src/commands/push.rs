//! `push`: replace the remote project with local files

use super::engine_with_progress;
use crate::config::ProjectContext;
use crate::sync::PushPayload;
use crate::types::SyncError;
use crate::ui::ProgressReporter;
use console::style;
use indicatif::HumanBytes;
use std::path::Path;
use std::sync::Arc;

pub fn run_push(context: &ProjectContext, dry_run: bool, to: Option<&Path>) -> Result<(), SyncError> {
    let reporter = Arc::new(ProgressReporter::new());
    let engine = engine_with_progress(context, &reporter);
    let label = context.root_dir.display().to_string();

    if dry_run {
        let payload = engine.prepare_push(&context.root_dir)?;
        reporter.finish_scan(&label, payload.files.len(), payload.untracked.len());
        reporter.finish();
        println!("{}", format_push_plan(&payload, &payload.digest()?, &context.root_dir));
        println!("Dry-run mode: the remote was not changed.");
        return Ok(());
    }

    let mut remote = context.remote(to)?;
    reporter.set_phase("Pushing...");
    let report = engine.push(&context.root_dir, &mut remote)?;
    reporter.finish_scan(&label, report.pushed.len(), report.untracked.len());
    let bytes = report
        .pushed
        .iter()
        .filter_map(|file| file.content.as_ref())
        .map(|content| content.len() as u64)
        .sum();
    reporter.finish_push(report.pushed.len(), bytes);

    println!(
        "{} {} files ({}) to {}",
        style("Pushed").green().bold(),
        report.pushed.len(),
        HumanBytes(bytes),
        remote.path().display()
    );
    println!("  digest: {}", report.digest);
    if !report.untracked.is_empty() {
        println!("  {} untracked file(s) left out", report.untracked.len());
    }
    Ok(())
}

/// Upload order preview for `push --dry-run`
fn format_push_plan(payload: &PushPayload, digest: &str, root: &Path) -> String {
    let mut lines = Vec::with_capacity(payload.files.len() + 3);
    lines.push(format!(
        "Push plan: {} files | {}",
        payload.files.len(),
        HumanBytes(payload.total_bytes())
    ));
    for (position, file) in payload.files.iter().enumerate() {
        let remote_type = file.remote_type.map(|t| t.as_str()).unwrap_or("?");
        lines.push(format!(
            "  {:>3}. {:<10} {:<24} {}",
            position + 1,
            remote_type,
            file.local_name,
            file.path_from(root).display()
        ));
    }
    if !payload.untracked.is_empty() {
        lines.push(format!("  ({} untracked file(s) omitted)", payload.untracked.len()));
    }
    lines.push(format!("  digest: {digest}"));
    lines.join("\n")
}
