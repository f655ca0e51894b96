use indicatif::{ProgressBar, ProgressStyle};
use slowsync_core::ProgressReporter;
use std::path::Path;
use std::sync::Mutex;

/// CLI progress reporter using indicatif.
///
/// - Walk phase: spinner (total files unknown upfront)
/// - Fingerprint phase: progress bar (total known from the walk)
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_walk_start(&self, root: &Path) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(format!("Walking {}...", root.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_walk_complete(&self, candidate_files: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Walk complete: {} candidate files",
            candidate_files
        );
        let pb = ProgressBar::new(candidate_files as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Fingerprinting [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_fingerprint_progress(&self, files_done: usize, total_files: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            if pb.length() != Some(total_files as u64) {
                pb.set_length(total_files as u64);
            }
            pb.set_position(files_done as u64);
        }
    }

    fn on_fingerprint_complete(&self, files: usize, skipped: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Fingerprint complete: {} files, {} skipped",
            files, skipped
        );
    }

    fn on_diff_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message("Comparing snapshots...");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_diff_complete(&self, matched: usize, relocated: usize, only_a: usize, only_b: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Diff complete: {} matched, {} relocated, {} only in A, {} only in B",
            matched, relocated, only_a, only_b
        );
    }
}
