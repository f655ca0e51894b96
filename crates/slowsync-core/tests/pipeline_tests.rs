use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use slowsync_core::{persist, SilentReporter, SyncConfig, SyncEngine};

fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn small_config() -> SyncConfig {
    // Tiny thresholds so short test files are retained.
    SyncConfig {
        min_size: 1,
        block_size: 1024,
    }
}

#[test]
fn test_only_in_a_yields_one_copy() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    write_file(tmp_a.path(), "x.txt", b"hello");

    let engine = SyncEngine::new(small_config());
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert_eq!(result.report.only_in_a.len(), 1);
    assert!(result.report.only_in_b.is_empty());
    assert!(result.report.matched.is_empty());
    assert!(result.report.relocated.is_empty());

    assert_eq!(result.plan.actions.len(), 1);
    let action = &result.plan.actions[0];
    assert_eq!(action.source, tmp_a.path().join("x.txt"));
    assert_eq!(action.destination, tmp_b.path().join("x.txt"));
    assert_eq!(result.plan.bytes_a_to_b, 5);
    assert_eq!(result.plan.bytes_b_to_a, 0);
}

#[test]
fn test_identical_content_same_path_is_matched() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    write_file(tmp_a.path(), "x.txt", b"identical content");
    write_file(tmp_b.path(), "x.txt", b"identical content");

    let engine = SyncEngine::new(small_config());
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert_eq!(result.report.matched.len(), 1);
    assert!(result.report.relocated.is_empty());
    assert!(result.report.only_in_a.is_empty());
    assert!(result.report.only_in_b.is_empty());
    assert!(result.plan.actions.is_empty());
}

#[test]
fn test_identical_content_different_path_is_relocated() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    write_file(tmp_a.path(), "a/x.txt", b"moved but unchanged");
    write_file(tmp_b.path(), "b/x.txt", b"moved but unchanged");

    let engine = SyncEngine::new(small_config());
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert_eq!(result.report.relocated.len(), 1);
    let pair = &result.report.relocated[0];
    assert_eq!(pair.a.relative_path, PathBuf::from("a/x.txt"));
    assert_eq!(pair.b.relative_path, PathBuf::from("b/x.txt"));

    // Relocations are reported, never acted on.
    assert!(result.plan.actions.is_empty());
    assert_eq!(result.plan.relocations.len(), 1);
}

#[test]
fn test_min_size_excludes_small_files_everywhere() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    // 100 bytes, below the 4096 threshold.
    write_file(tmp_a.path(), "tiny.bin", &[0x55u8; 100]);
    write_file(tmp_a.path(), "big.bin", &[0x66u8; 5000]);

    let config = SyncConfig {
        min_size: 4096,
        block_size: 1024,
    };
    let engine = SyncEngine::new(config);
    let snapshot = engine.snapshot(tmp_a.path(), &SilentReporter).unwrap();

    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.get(Path::new("tiny.bin")).is_none());
    assert!(snapshot.get(Path::new("big.bin")).is_some());

    // The excluded file never appears in any classification.
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();
    assert_eq!(result.report.only_in_a.len(), 1);
    assert_eq!(
        result.report.only_in_a[0].relative_path,
        PathBuf::from("big.bin")
    );
}

#[test]
fn test_engineered_collision_never_matches() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    // Same 16-byte prefix, different tails: identical cheap fingerprint
    // with block_size 16, different full content.
    write_file(tmp_a.path(), "x.bin", b"0123456789abcdefAAAA");
    write_file(tmp_b.path(), "x.bin", b"0123456789abcdefBBBB");

    let config = SyncConfig {
        min_size: 1,
        block_size: 16,
    };
    let engine = SyncEngine::new(config);
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert!(result.report.matched.is_empty());
    assert!(result.report.relocated.is_empty());
    assert_eq!(result.report.only_in_a.len(), 1);
    assert_eq!(result.report.only_in_b.len(), 1);

    // Both sides get copied; the collision suppressed nothing.
    assert_eq!(result.plan.actions.len(), 2);
}

#[test]
fn test_partition_law_on_mixed_tree() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    write_file(tmp_a.path(), "same.txt", b"kept in place");
    write_file(tmp_b.path(), "same.txt", b"kept in place");
    write_file(tmp_a.path(), "old/moved.txt", b"travelling content");
    write_file(tmp_b.path(), "new/moved.txt", b"travelling content");
    write_file(tmp_a.path(), "solo_a.txt", b"only on side a");
    write_file(tmp_b.path(), "solo_b.txt", b"only on side b");

    let engine = SyncEngine::new(small_config());
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert_eq!(result.report.matched.len(), 1);
    assert_eq!(result.report.relocated.len(), 1);
    assert_eq!(result.report.only_in_a.len(), 1);
    assert_eq!(result.report.only_in_b.len(), 1);

    // 3 files per side, each classified exactly once.
    assert_eq!(result.files_in_a, 3);
    assert_eq!(result.files_in_b, 3);
    assert_eq!(
        result.report.total_classified(),
        result.files_in_a + result.files_in_b
    );
}

#[test]
fn test_intra_tree_duplicates_pair_first_available() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    // Two identical copies in A, one in B: one pair resolves, the leftover
    // A record falls to only_in_a.
    write_file(tmp_a.path(), "copy1.txt", b"duplicated payload");
    write_file(tmp_a.path(), "copy2.txt", b"duplicated payload");
    write_file(tmp_b.path(), "copy1.txt", b"duplicated payload");

    let engine = SyncEngine::new(small_config());
    let result = engine
        .reconcile(tmp_a.path(), tmp_b.path(), &SilentReporter)
        .unwrap();

    assert_eq!(
        result.report.matched.len() + result.report.relocated.len(),
        1
    );
    assert_eq!(result.report.only_in_a.len(), 1);
    assert!(result.report.only_in_b.is_empty());
}

#[test]
fn test_idempotent_rebuild() {
    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "one.txt", b"first file body");
    write_file(tmp.path(), "sub/two.txt", b"second file body");

    let engine = SyncEngine::new(small_config());
    let first = engine.snapshot(tmp.path(), &SilentReporter).unwrap();
    let second = engine.snapshot(tmp.path(), &SilentReporter).unwrap();

    assert_eq!(first.len(), second.len());
    for (rel, record) in first.records() {
        let other = second.get(rel).expect("record missing on rebuild");
        assert_eq!(record.fingerprint, other.fingerprint);
        assert_eq!(record.size, other.size);
    }
    assert_eq!(
        first.by_fingerprint().len(),
        second.by_fingerprint().len()
    );
}

#[test]
fn test_snapshot_round_trip() {
    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "keep/data.bin", &[0xC3u8; 2048]);
    write_file(tmp.path(), "other.bin", b"some persisted bytes");

    let engine = SyncEngine::new(small_config());
    let snapshot = engine.snapshot(tmp.path(), &SilentReporter).unwrap();

    let bytes = persist::serialize(&snapshot).unwrap();
    let restored = persist::deserialize(&bytes).unwrap();

    assert_eq!(restored.root_dir(), snapshot.root_dir());
    assert_eq!(restored.records(), snapshot.records());
    assert_eq!(restored.by_fingerprint(), snapshot.by_fingerprint());
    assert_eq!(restored.skipped(), snapshot.skipped());
}

#[test]
fn test_save_and_load_snapshot_file() {
    let tmp = tempdir().unwrap();
    let db_dir = tempdir().unwrap();
    write_file(tmp.path(), "x.txt", b"persist me to disk");

    let engine = SyncEngine::new(small_config());
    let snapshot = engine.snapshot(tmp.path(), &SilentReporter).unwrap();

    let db_path = db_dir.path().join("snapshot.db");
    persist::save_snapshot(&snapshot, &db_path).unwrap();
    let loaded = persist::load_snapshot(&db_path).unwrap();

    assert_eq!(loaded.records(), snapshot.records());

    // Diffing a loaded snapshot against a fresh one of the same tree
    // classifies everything as matched.
    let fresh = engine.snapshot(tmp.path(), &SilentReporter).unwrap();
    let report = engine.diff(&loaded, &fresh).unwrap();
    assert_eq!(report.matched.len(), 1);
    assert!(report.only_in_a.is_empty());
    assert!(report.only_in_b.is_empty());
}

#[test]
fn test_cancellation_aborts_build() {
    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "x.txt", b"never fingerprinted");

    let engine = SyncEngine::new(small_config());
    engine
        .cancel_token()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    match engine.snapshot(tmp.path(), &SilentReporter) {
        Err(slowsync_core::Error::Cancelled) => {}
        other => panic!("Expected Cancelled, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_collision_check_reports_duplicates_and_collisions() {
    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "dup1.bin", b"0123456789abcdefSAME");
    write_file(tmp.path(), "dup2.bin", b"0123456789abcdefSAME");
    write_file(tmp.path(), "clash.bin", b"0123456789abcdefDIFF");
    write_file(tmp.path(), "unique.bin", b"nothing like the others");

    let config = SyncConfig {
        min_size: 1,
        block_size: 16,
    };
    let engine = SyncEngine::new(config);
    let report = engine
        .collision_check(tmp.path(), &SilentReporter)
        .unwrap();

    assert!(!report.is_clean());
    // dup1/dup2 are true duplicates; each pairs with clash as a collision.
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.collisions.len(), 2);
}

#[test]
fn test_collision_check_clean_tree() {
    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"first distinct body");
    write_file(tmp.path(), "b.txt", b"second distinct body!");

    let engine = SyncEngine::new(small_config());
    let report = engine
        .collision_check(tmp.path(), &SilentReporter)
        .unwrap();
    assert!(report.is_clean());
}

#[test]
#[cfg(unix)]
fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    write_file(tmp.path(), "good.txt", b"readable body");
    let locked = write_file(tmp.path(), "locked.txt", b"unreadable body");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // File modes don't bind root; nothing to exercise in that case.
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let engine = SyncEngine::new(small_config());
    let snapshot = engine.snapshot(tmp.path(), &SilentReporter).unwrap();

    // The unreadable file is excluded but recorded; the build continues.
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.get(Path::new("good.txt")).is_some());
    assert_eq!(snapshot.skipped().len(), 1);
    assert_eq!(snapshot.skipped()[0].path, locked);
    assert!(!snapshot.skipped()[0].reason.is_empty());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn test_cancellation_aborts_diff() {
    let tmp_a = tempdir().unwrap();
    let tmp_b = tempdir().unwrap();
    write_file(tmp_a.path(), "x.txt", b"present on side a");

    let engine = SyncEngine::new(small_config());
    let a = engine.snapshot(tmp_a.path(), &SilentReporter).unwrap();
    let b = engine.snapshot(tmp_b.path(), &SilentReporter).unwrap();

    engine
        .cancel_token()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    match engine.diff(&a, &b) {
        Err(slowsync_core::Error::Cancelled) => {}
        other => panic!(
            "Expected Cancelled, got {:?}",
            other.map(|r| r.total_classified())
        ),
    }
}

#[test]
fn test_symlinks_are_not_followed() {
    #[cfg(unix)]
    {
        let tmp = tempdir().unwrap();
        write_file(tmp.path(), "real/target.txt", b"linked file body");
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("loop")).unwrap();

        let engine = SyncEngine::new(small_config());
        let snapshot = engine.snapshot(tmp.path(), &SilentReporter).unwrap();

        // Only the real file; the symlinked directory is not walked.
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get(Path::new("real/target.txt")).is_some());
    }
}
