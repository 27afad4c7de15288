//! `pull`: overwrite local files with the remote project

use crate::config::ProjectContext;
use crate::sync::SnapshotRemote;
use crate::types::{ProjectFile, SyncError};
use crate::ui::ProgressReporter;
use console::style;
use std::path::Path;

pub fn run_pull(context: &ProjectContext, from: Option<&Path>) -> Result<(), SyncError> {
    let remote: SnapshotRemote = context.remote(from)?;
    let reporter = ProgressReporter::new();
    reporter.set_phase(&format!("Pulling from {}...", remote.path().display()));

    let written = context.engine().pull(&remote, &context.root_dir)?;
    reporter.finish();

    println!("{}", format_pull_summary(&written, &context.root_dir));
    Ok(())
}

fn format_pull_summary(written: &[ProjectFile], root: &Path) -> String {
    let mut lines = vec![format!(
        "{} {} files into {}",
        style("Pulled").green().bold(),
        written.len(),
        root.display()
    )];
    lines.extend(
        written
            .iter()
            .map(|file| format!("  {}", file.path_from(root).display())),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteType;
    use std::path::PathBuf;

    #[test]
    fn test_pull_summary_lists_root_joined_paths() {
        console::set_colors_enabled(false);
        let written = vec![ProjectFile::tracked(
            PathBuf::from("lib/Util.js"),
            "lib.Util".to_string(),
            RemoteType::ServerJs,
        )];

        let summary = format_pull_summary(&written, Path::new("dist"));
        assert!(summary.starts_with("Pulled 1 files into dist"));
        assert!(summary.contains("  dist/lib/Util.js"));
    }
}
