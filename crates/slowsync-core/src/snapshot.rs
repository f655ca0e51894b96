use crate::config::SyncConfig;
use crate::error::Error;
use crate::fingerprint::FingerprintEngine;
use crate::progress::ProgressReporter;
use dashmap::DashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// One on-disk file at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the snapshot root. Primary key within a snapshot.
    pub relative_path: PathBuf,
    /// Root the snapshot was taken against. Not part of identity; only
    /// used to reconstruct the absolute path.
    pub root_dir: PathBuf,
    pub size: u64,
    /// Cheap-tier digest (leading block only).
    pub fingerprint: u64,
}

impl FileRecord {
    pub fn absolute_path(&self) -> PathBuf {
        self.root_dir.join(&self.relative_path)
    }
}

/// A file the walk could not read. Surfaced as data, not only as a log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Immutable inventory of one root directory, indexed by relative path and
/// by cheap fingerprint. The fingerprint index is multi-valued: distinct
/// files legitimately share a cheap fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    root_dir: PathBuf,
    records: HashMap<PathBuf, FileRecord>,
    by_fingerprint: HashMap<u64, Vec<PathBuf>>,
    skipped: Vec<SkippedFile>,
}

impl Snapshot {
    /// Index a list of records. Fails if two records share a relative path;
    /// a silent overwrite there would hide a walk bug or an inconsistent tree.
    pub(crate) fn assemble(
        root_dir: PathBuf,
        record_list: Vec<FileRecord>,
        skipped: Vec<SkippedFile>,
    ) -> Result<Self, Error> {
        let mut records: HashMap<PathBuf, FileRecord> = HashMap::with_capacity(record_list.len());
        let mut by_fingerprint: HashMap<u64, Vec<PathBuf>> = HashMap::new();

        for record in record_list {
            if records.contains_key(&record.relative_path) {
                return Err(Error::StructuralIntegrity {
                    path: record.relative_path,
                });
            }
            by_fingerprint
                .entry(record.fingerprint)
                .or_default()
                .push(record.relative_path.clone());
            records.insert(record.relative_path.clone(), record);
        }

        Ok(Self {
            root_dir,
            records,
            by_fingerprint,
            skipped,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn records(&self) -> &HashMap<PathBuf, FileRecord> {
        &self.records
    }

    pub fn by_fingerprint(&self) -> &HashMap<u64, Vec<PathBuf>> {
        &self.by_fingerprint
    }

    pub fn get(&self, relative_path: &Path) -> Option<&FileRecord> {
        self.records.get(relative_path)
    }

    /// Records sharing a cheap fingerprint, in index order.
    pub fn records_for_fingerprint(&self, fingerprint: u64) -> Vec<&FileRecord> {
        self.by_fingerprint
            .get(&fingerprint)
            .map(|paths| paths.iter().filter_map(|p| self.records.get(p)).collect())
            .unwrap_or_default()
    }

    /// Files excluded from the inventory because they could not be read.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A regular file found by the walk, before fingerprinting.
struct Candidate {
    absolute: PathBuf,
    relative: PathBuf,
    size: u64,
}

/// Walks a directory tree and produces a `Snapshot`.
///
/// The walk itself is sequential per directory; fingerprint computation fans
/// out over the rayon pool and joins before `build` returns. Per-file read
/// failures are skipped and recorded, never fatal to the whole walk.
pub struct SnapshotBuilder {
    config: SyncConfig,
    engine: FingerprintEngine,
    cancel: Arc<AtomicBool>,
}

impl SnapshotBuilder {
    pub fn new(config: SyncConfig) -> Self {
        let engine = FingerprintEngine::new(config.block_size);
        Self {
            config,
            engine,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation token; the build aborts with `Error::Cancelled`
    /// at the next per-file checkpoint after the token is set.
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = token;
        self
    }

    pub fn build(
        &self,
        root_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<Snapshot, Error> {
        reporter.on_walk_start(root_dir);

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut skipped: Vec<SkippedFile> = Vec::new();
        self.collect_candidates(root_dir, root_dir, &mut candidates, &mut skipped)?;
        reporter.on_walk_complete(candidates.len());

        // Fingerprint in parallel; a file that fails to read is skipped so a
        // single bad file cannot block synchronization of the rest of the tree.
        let fingerprints: DashMap<PathBuf, u64> = DashMap::new();
        let read_failures: DashMap<PathBuf, String> = DashMap::new();
        let done = AtomicUsize::new(0);
        let total = candidates.len();

        candidates.par_iter().try_for_each(|candidate| {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            match self.engine.cheap(&candidate.absolute) {
                Ok(fingerprint) => {
                    fingerprints.insert(candidate.absolute.clone(), fingerprint);
                }
                Err(err) => {
                    warn!(
                        "Skipping unreadable file '{}': {}",
                        candidate.absolute.display(),
                        err
                    );
                    read_failures.insert(candidate.absolute.clone(), err.to_string());
                }
            }
            reporter.on_fingerprint_progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            Ok(())
        })?;

        let mut records: Vec<FileRecord> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(fingerprint) = fingerprints.get(&candidate.absolute) {
                records.push(FileRecord {
                    relative_path: candidate.relative,
                    root_dir: root_dir.to_path_buf(),
                    size: candidate.size,
                    fingerprint: *fingerprint.value(),
                });
            } else if let Some(reason) = read_failures.get(&candidate.absolute) {
                skipped.push(SkippedFile {
                    path: candidate.absolute.clone(),
                    reason: reason.value().clone(),
                });
            }
        }
        reporter.on_fingerprint_complete(records.len(), skipped.len());

        Snapshot::assemble(root_dir.to_path_buf(), records, skipped)
    }

    fn collect_candidates(
        &self,
        root: &Path,
        dir: &Path,
        out: &mut Vec<Candidate>,
        skipped: &mut Vec<SkippedFile>,
    ) -> Result<(), Error> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                warn!("Access denied reading directory '{}': {}", dir.display(), err);
                skipped.push(SkippedFile {
                    path: dir.to_path_buf(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
            Err(err) => {
                return Err(Error::Io(io::Error::new(
                    err.kind(),
                    format!("Error reading directory '{}': {}", dir.display(), err),
                )))
            }
        };

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error reading entry in '{}': {}", dir.display(), err);
                    skipped.push(SkippedFile {
                        path: dir.to_path_buf(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!("Error getting metadata for '{}': {}", path.display(), err);
                    skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            // Symlinks are never followed; a cycle would revisit paths.
            if metadata.file_type().is_symlink() {
                continue;
            }

            if metadata.is_dir() {
                self.collect_candidates(root, &path, out, skipped)?;
            } else if metadata.is_file() {
                if metadata.len() < self.config.min_size {
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .map(|p| p.to_path_buf())
                    .map_err(|_| Error::StructuralIntegrity { path: path.clone() })?;
                out.push(Candidate {
                    absolute: path,
                    relative,
                    size: metadata.len(),
                });
            }
        }

        Ok(())
    }
}
