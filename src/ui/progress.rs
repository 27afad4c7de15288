//! Progress reporting

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while a command walks, reads, or writes.
///
/// indicatif hides the spinner when stderr is not a terminal, so piped
/// output stays clean.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        Self { bar }
    }

    /// Reporter that never draws; used for `--json` output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Mark start of the project walk.
    pub fn start_scan(&self, root: &str) {
        self.bar.set_message(format!("Scanning {}...", root));
    }

    /// Update walk counters.
    pub fn update_scan(&self, root: &str, files: u64) {
        self.bar
            .set_message(format!("Scanning {}... {} files", root, files));
    }

    /// Mark completion of the walk.
    pub fn finish_scan(&self, root: &str, tracked: usize, untracked: usize) {
        self.bar.set_message(format!(
            "Scanned {}: {} tracked | {} untracked",
            root, tracked, untracked
        ));
        tracing::debug!(root, tracked, untracked, "scan finished");
    }

    /// Show the current phase (reading, uploading, writing).
    pub fn set_phase(&self, phase: &str) {
        self.bar.set_message(phase.to_string());
    }

    /// Clear the spinner after a push.
    pub fn finish_push(&self, files: usize, bytes: u64) {
        self.bar.finish_and_clear();
        tracing::debug!(files, bytes = %HumanBytes(bytes), "push finished");
    }

    /// Clear the spinner, leaving the terminal to the command's own output.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
