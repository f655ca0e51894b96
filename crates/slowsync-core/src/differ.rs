use crate::error::Error;
use crate::fingerprint::FingerprintEngine;
use crate::resolver::{self, Verdict};
use crate::snapshot::{FileRecord, Snapshot};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Same fingerprint, content proven identical, same relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub fingerprint: u64,
    pub a: FileRecord,
    pub b: FileRecord,
}

/// Content proven identical, but living at different relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocatedPair {
    pub fingerprint: u64,
    pub a: FileRecord,
    pub b: FileRecord,
}

/// Four-way classification of every file in either snapshot. The categories
/// partition the union of both snapshots' fingerprint sets.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    pub matched: Vec<MatchedPair>,
    pub relocated: Vec<RelocatedPair>,
    pub only_in_a: Vec<FileRecord>,
    pub only_in_b: Vec<FileRecord>,
}

impl DiffReport {
    /// Number of records classified, counting each side's contribution once.
    pub fn total_classified(&self) -> usize {
        self.matched.len() * 2
            + self.relocated.len() * 2
            + self.only_in_a.len()
            + self.only_in_b.len()
    }
}

/// Compare two snapshots.
///
/// Every cross-snapshot fingerprint match is arbitrated by the collision
/// resolver before being reported as `Matched`/`Relocated`. When a fingerprint
/// maps to several records on one side, records are paired in
/// first-available order; leftovers fall to their side's `OnlyIn` bucket.
/// No optimal many-to-many matching is attempted.
pub fn diff(
    a: &Snapshot,
    b: &Snapshot,
    engine: &FingerprintEngine,
    cancel: &AtomicBool,
) -> Result<DiffReport, Error> {
    let mut report = DiffReport::default();
    let mut visited: HashSet<u64> = HashSet::with_capacity(a.by_fingerprint().len());

    for (&fingerprint, _) in a.by_fingerprint() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        visited.insert(fingerprint);

        let a_records = a.records_for_fingerprint(fingerprint);
        if !b.by_fingerprint().contains_key(&fingerprint) {
            report.only_in_a.extend(a_records.into_iter().cloned());
            continue;
        }
        let b_records = b.records_for_fingerprint(fingerprint);

        let paired = a_records.len().min(b_records.len());
        for i in 0..paired {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let record_a = a_records[i];
            let record_b = b_records[i];
            match resolver::resolve(engine, record_a, record_b)? {
                Verdict::Collision => {
                    report.only_in_a.push(record_a.clone());
                    report.only_in_b.push(record_b.clone());
                }
                Verdict::Identical => {
                    if record_a.relative_path == record_b.relative_path {
                        report.matched.push(MatchedPair {
                            fingerprint,
                            a: record_a.clone(),
                            b: record_b.clone(),
                        });
                    } else {
                        report.relocated.push(RelocatedPair {
                            fingerprint,
                            a: record_a.clone(),
                            b: record_b.clone(),
                        });
                    }
                }
            }
        }

        // Unpaired duplicates within one tree.
        report
            .only_in_a
            .extend(a_records[paired..].iter().map(|r| (*r).clone()));
        report
            .only_in_b
            .extend(b_records[paired..].iter().map(|r| (*r).clone()));
    }

    for (&fingerprint, _) in b.by_fingerprint() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        if visited.contains(&fingerprint) {
            continue;
        }
        report
            .only_in_b
            .extend(b.records_for_fingerprint(fingerprint).into_iter().cloned());
    }

    Ok(report)
}
