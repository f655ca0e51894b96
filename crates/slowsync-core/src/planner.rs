use crate::differ::{DiffReport, RelocatedPair};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Copy,
}

/// One transfer operation, with absolute endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Ordered transfer plan plus the relocation report.
///
/// Relocations deliberately produce no action: guessing which side should be
/// renamed, deleted, or re-copied is policy the caller must decide.
#[derive(Debug, Clone, Default)]
pub struct TransferPlan {
    pub actions: Vec<Action>,
    pub relocations: Vec<RelocatedPair>,
    pub bytes_a_to_b: u64,
    pub bytes_b_to_a: u64,
}

/// Turn a diff report into copy actions. `OnlyInA`-derived actions precede
/// `OnlyInB`-derived ones; within each group the order follows the differ's
/// enumeration order, which is not path-sorted — callers wanting determinism
/// sort post hoc.
pub fn plan(report: &DiffReport, root_a: &Path, root_b: &Path) -> TransferPlan {
    let mut actions = Vec::with_capacity(report.only_in_a.len() + report.only_in_b.len());
    let mut bytes_a_to_b = 0u64;
    let mut bytes_b_to_a = 0u64;

    for record in &report.only_in_a {
        actions.push(Action {
            kind: ActionKind::Copy,
            source: root_a.join(&record.relative_path),
            destination: root_b.join(&record.relative_path),
        });
        bytes_a_to_b += record.size;
    }

    for record in &report.only_in_b {
        actions.push(Action {
            kind: ActionKind::Copy,
            source: root_b.join(&record.relative_path),
            destination: root_a.join(&record.relative_path),
        });
        bytes_b_to_a += record.size;
    }

    TransferPlan {
        actions,
        relocations: report.relocated.clone(),
        bytes_a_to_b,
        bytes_b_to_a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FileRecord;

    fn record(root: &str, rel: &str, size: u64, fingerprint: u64) -> FileRecord {
        FileRecord {
            relative_path: PathBuf::from(rel),
            root_dir: PathBuf::from(root),
            size,
            fingerprint,
        }
    }

    #[test]
    fn test_only_in_a_actions_precede_only_in_b() {
        let report = DiffReport {
            matched: vec![],
            relocated: vec![],
            only_in_a: vec![record("/a", "one.bin", 100, 1)],
            only_in_b: vec![record("/b", "two.bin", 200, 2)],
        };
        let plan = plan(&report, Path::new("/a"), Path::new("/b"));

        assert_eq!(plan.actions.len(), 2);
        assert_eq!(plan.actions[0].source, PathBuf::from("/a/one.bin"));
        assert_eq!(plan.actions[0].destination, PathBuf::from("/b/one.bin"));
        assert_eq!(plan.actions[1].source, PathBuf::from("/b/two.bin"));
        assert_eq!(plan.actions[1].destination, PathBuf::from("/a/two.bin"));
        assert_eq!(plan.bytes_a_to_b, 100);
        assert_eq!(plan.bytes_b_to_a, 200);
    }

    #[test]
    fn test_relocations_produce_no_actions() {
        let pair = crate::differ::RelocatedPair {
            fingerprint: 5,
            a: record("/a", "old/name.bin", 10, 5),
            b: record("/b", "new/name.bin", 10, 5),
        };
        let report = DiffReport {
            matched: vec![],
            relocated: vec![pair],
            only_in_a: vec![],
            only_in_b: vec![],
        };
        let plan = plan(&report, Path::new("/a"), Path::new("/b"));

        assert!(plan.actions.is_empty());
        assert_eq!(plan.relocations.len(), 1);
    }
}
