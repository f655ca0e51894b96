use crate::config::SyncConfig;
use crate::differ::{self, DiffReport};
use crate::error::Error;
use crate::fingerprint::FingerprintEngine;
use crate::planner::{self, TransferPlan};
use crate::progress::ProgressReporter;
use crate::snapshot::{FileRecord, Snapshot, SnapshotBuilder};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Façade over the snapshot/diff/plan pipeline.
pub struct SyncEngine {
    config: SyncConfig,
    engine: FingerprintEngine,
    cancel: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct SyncResult {
    pub snapshot_a_duration: Duration,
    pub snapshot_b_duration: Duration,
    pub diff_duration: Duration,
    pub files_in_a: usize,
    pub files_in_b: usize,
    pub skipped_in_a: usize,
    pub skipped_in_b: usize,
    pub report: DiffReport,
    pub plan: TransferPlan,
}

/// Result of checking a single tree for cheap-fingerprint clashes:
/// true duplicates (full content identical) and genuine collisions.
#[derive(Debug, Default)]
pub struct CollisionCheckReport {
    pub duplicates: Vec<(FileRecord, FileRecord)>,
    pub collisions: Vec<(FileRecord, FileRecord)>,
}

impl CollisionCheckReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.collisions.is_empty()
    }
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        let engine = FingerprintEngine::new(config.block_size);
        Self {
            config,
            engine,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Token shared with every phase; set it to abort at the next per-file
    /// checkpoint.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn snapshot(
        &self,
        root_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<Snapshot, Error> {
        SnapshotBuilder::new(self.config.clone())
            .with_cancel_token(Arc::clone(&self.cancel))
            .build(root_dir, reporter)
    }

    pub fn diff(&self, a: &Snapshot, b: &Snapshot) -> Result<DiffReport, Error> {
        differ::diff(a, b, &self.engine, &self.cancel)
    }

    pub fn plan(&self, report: &DiffReport, root_a: &Path, root_b: &Path) -> TransferPlan {
        planner::plan(report, root_a, root_b)
    }

    /// Run the full pipeline over two live directories:
    /// 1. Snapshot each root (parallel fingerprinting, min-size filter)
    /// 2. Diff the snapshots (collision-resolved classification)
    /// 3. Plan transfers for the one-sided files
    pub fn reconcile(
        &self,
        root_a: &Path,
        root_b: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncResult, Error> {
        info!(
            "Reconciling '{}' against '{}'",
            root_a.display(),
            root_b.display()
        );

        let start_a = Instant::now();
        let snapshot_a = self.snapshot(root_a, reporter)?;
        let snapshot_a_duration = start_a.elapsed();
        debug!(
            "Snapshot A completed in {:.2}s — {} files, {} skipped",
            snapshot_a_duration.as_secs_f64(),
            snapshot_a.len(),
            snapshot_a.skipped().len(),
        );

        let start_b = Instant::now();
        let snapshot_b = self.snapshot(root_b, reporter)?;
        let snapshot_b_duration = start_b.elapsed();
        debug!(
            "Snapshot B completed in {:.2}s — {} files, {} skipped",
            snapshot_b_duration.as_secs_f64(),
            snapshot_b.len(),
            snapshot_b.skipped().len(),
        );

        reporter.on_diff_start();
        let diff_start = Instant::now();
        let report = self.diff(&snapshot_a, &snapshot_b)?;
        let diff_duration = diff_start.elapsed();
        reporter.on_diff_complete(
            report.matched.len(),
            report.relocated.len(),
            report.only_in_a.len(),
            report.only_in_b.len(),
        );
        debug!(
            "Diff completed in {:.2}s — {} matched, {} relocated, {} only in A, {} only in B",
            diff_duration.as_secs_f64(),
            report.matched.len(),
            report.relocated.len(),
            report.only_in_a.len(),
            report.only_in_b.len(),
        );

        let plan = self.plan(&report, root_a, root_b);

        Ok(SyncResult {
            snapshot_a_duration,
            snapshot_b_duration,
            diff_duration,
            files_in_a: snapshot_a.len(),
            files_in_b: snapshot_b.len(),
            skipped_in_a: snapshot_a.skipped().len(),
            skipped_in_b: snapshot_b.skipped().len(),
            report,
            plan,
        })
    }

    /// Scan one tree and resolve every cheap-fingerprint group: reports
    /// which clashes are true duplicates and which are collisions. Debugging
    /// aid for judging whether the lazy fast-hash behaves on a given tree.
    pub fn collision_check(
        &self,
        root_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<CollisionCheckReport, Error> {
        let snapshot = self.snapshot(root_dir, reporter)?;
        let mut report = CollisionCheckReport::default();

        for (&fingerprint, paths) in snapshot.by_fingerprint() {
            if paths.len() < 2 {
                continue;
            }
            let records = snapshot.records_for_fingerprint(fingerprint);
            for i in 0..records.len() {
                for j in (i + 1)..records.len() {
                    if self.cancel.load(Ordering::Relaxed) {
                        return Err(Error::Cancelled);
                    }
                    let pair = (records[i].clone(), records[j].clone());
                    match crate::resolver::resolve(&self.engine, records[i], records[j])? {
                        crate::resolver::Verdict::Identical => report.duplicates.push(pair),
                        crate::resolver::Verdict::Collision => report.collisions.push(pair),
                    }
                }
            }
        }

        Ok(report)
    }
}
