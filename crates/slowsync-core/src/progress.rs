use std::path::Path;

/// Trait for reporting pipeline progress.
///
/// CLI implements with indicatif; library callers that don't care use
/// `SilentReporter`. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_walk_start(&self, _root: &Path) {}
    fn on_walk_complete(&self, _candidate_files: usize) {}
    fn on_fingerprint_progress(&self, _files_done: usize, _total_files: usize) {}
    fn on_fingerprint_complete(&self, _files: usize, _skipped: usize) {}
    fn on_diff_start(&self) {}
    fn on_diff_complete(&self, _matched: usize, _relocated: usize, _only_a: usize, _only_b: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
