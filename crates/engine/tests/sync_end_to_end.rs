//! End-to-end engine scenarios over real fixture trees.

use std::fs;
use std::path::Path;

use engine::{CancelFlag, ChangeDetection, HashAlgorithm, SyncOptions, run_sync};

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

#[test]
fn fresh_destination_receives_every_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("x.txt"), b"ten bytes!");
    write(&src.join("sub/y.txt"), b"");
    fs::create_dir(&dst).expect("create dst");

    let summary = run_sync(
        &src,
        &dst,
        &SyncOptions::default(),
        None,
        &CancelFlag::new(),
    )
    .expect("sync succeeds");

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_copied, 2);
    assert_eq!(summary.bytes_copied, 10);
    assert_eq!(summary.errors(), 0);
    assert_eq!(fs::read(dst.join("x.txt")).expect("read"), b"ten bytes!");
    assert_eq!(fs::read(dst.join("sub/y.txt")).expect("read"), b"");
}

#[test]
fn second_run_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("a.txt"), b"alpha");
    write(&src.join("deep/b.txt"), b"beta");
    fs::create_dir(&dst).expect("create dst");

    let options = SyncOptions::default();
    let cancel = CancelFlag::new();
    let first = run_sync(&src, &dst, &options, None, &cancel).expect("first run");
    assert_eq!(first.files_copied, 2);

    let second = run_sync(&src, &dst, &options, None, &cancel).expect("second run");
    assert_eq!(second.files_copied, 0);
    assert_eq!(second.files_up_to_date, 2);
    assert_eq!(fs::read(dst.join("a.txt")).expect("read"), b"alpha");
}

#[test]
fn hash_check_rerun_transfers_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("x.txt"), b"ten bytes!");
    write(&src.join("sub/y.txt"), b"");
    fs::create_dir(&dst).expect("create dst");

    let cancel = CancelFlag::new();
    run_sync(&src, &dst, &SyncOptions::default(), None, &cancel).expect("first run");

    let options = SyncOptions {
        detection: ChangeDetection::Checksum(HashAlgorithm::Md5),
        ..SyncOptions::default()
    };
    let summary = run_sync(&src, &dst, &options, None, &cancel).expect("hash run");
    assert_eq!(summary.files_copied, 0);
    assert_eq!(summary.bytes_copied, 0);
    assert_eq!(summary.files_up_to_date, 2);
}

#[test]
fn hash_check_ignores_mtime_but_catches_content_change() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("file.bin"), b"same content");
    write(&dst.join("file.bin"), b"same content");
    // Push the timestamps apart; content equality must still win.
    filetime::set_file_mtime(
        src.join("file.bin"),
        filetime::FileTime::from_unix_time(1_000_000, 0),
    )
    .expect("set mtime");

    let options = SyncOptions {
        detection: ChangeDetection::Checksum(HashAlgorithm::Sha256),
        ..SyncOptions::default()
    };
    let cancel = CancelFlag::new();
    let summary = run_sync(&src, &dst, &options, None, &cancel).expect("sync");
    assert_eq!(summary.files_copied, 0);

    write(&dst.join("file.bin"), b"same CONTENT");
    let summary = run_sync(&src, &dst, &options, None, &cancel).expect("sync");
    assert_eq!(summary.files_copied, 1);
    assert_eq!(fs::read(dst.join("file.bin")).expect("read"), b"same content");
}

#[test]
fn pre_delete_removes_extraneous_files_and_dirs() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("a.txt"), b"a");
    write(&src.join("b.txt"), b"b");
    write(&dst.join("a.txt"), b"a");
    write(&dst.join("b.txt"), b"b");
    write(&dst.join("gone/c.txt"), b"c");

    let options = SyncOptions {
        delete_before: true,
        ..SyncOptions::default()
    };
    let summary = run_sync(&src, &dst, &options, None, &CancelFlag::new()).expect("sync");

    assert_eq!(summary.files_deleted, 1);
    assert_eq!(summary.dirs_pruned, 1);
    assert_eq!(summary.delete_failures, 0);
    assert!(dst.join("a.txt").exists());
    assert!(dst.join("b.txt").exists());
    assert!(!dst.join("gone").exists());
}

#[test]
fn post_delete_runs_after_copies_complete() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("new.txt"), b"new");
    write(&dst.join("stale.txt"), b"stale");

    let options = SyncOptions {
        delete_after: true,
        ..SyncOptions::default()
    };
    let summary = run_sync(&src, &dst, &options, None, &CancelFlag::new()).expect("sync");

    assert_eq!(summary.files_copied, 1);
    assert_eq!(summary.files_deleted, 1);
    assert!(dst.join("new.txt").exists());
    assert!(!dst.join("stale.txt").exists());
}

#[test]
fn sibling_files_racing_on_parent_creation_all_succeed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    for i in 0..32 {
        write(&src.join(format!("shared/parent/file-{i:02}.txt")), b"data");
    }
    fs::create_dir(&dst).expect("create dst");

    let options = SyncOptions {
        workers: Some(8),
        ..SyncOptions::default()
    };
    let summary = run_sync(&src, &dst, &options, None, &CancelFlag::new()).expect("sync");

    assert_eq!(summary.files_copied, 32);
    assert_eq!(summary.copy_failures, 0);
    for i in 0..32 {
        assert!(dst.join(format!("shared/parent/file-{i:02}.txt")).exists());
    }
}

#[test]
fn cancelled_run_starts_no_new_work() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("a.txt"), b"a");
    write(&src.join("b.txt"), b"b");
    fs::create_dir(&dst).expect("create dst");

    let cancel = CancelFlag::new();
    cancel.cancel();
    let summary =
        run_sync(&src, &dst, &SyncOptions::default(), None, &cancel).expect("sync returns");

    assert!(summary.interrupted);
    assert_eq!(summary.files_copied, 0);
    assert!(!dst.join("a.txt").exists());
}

#[test]
fn relative_roots_resolve_against_the_current_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    write(&temp.path().join("src/kept.txt"), b"kept");
    write(&temp.path().join("src/fresh.txt"), b"fresh");
    write(&temp.path().join("dst/kept.txt"), b"kept");
    write(&temp.path().join("dst/stale.txt"), b"stale");

    // The only test in this binary that touches the working directory; every
    // other test uses absolute fixture paths.
    let previous = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(temp.path()).expect("enter tempdir");
    let options = SyncOptions {
        delete_before: true,
        ..SyncOptions::default()
    };
    let result = run_sync(
        Path::new("src"),
        Path::new("dst"),
        &options,
        None,
        &CancelFlag::new(),
    );
    std::env::set_current_dir(previous).expect("restore cwd");

    let summary = result.expect("sync succeeds");
    assert_eq!(summary.files_copied, 1);
    assert_eq!(summary.files_deleted, 1);
    assert!(
        temp.path().join("dst/kept.txt").exists(),
        "file present in source must survive reconciliation"
    );
    assert_eq!(
        fs::read(temp.path().join("dst/fresh.txt")).expect("read"),
        b"fresh"
    );
    assert!(!temp.path().join("dst/stale.txt").exists());
}

#[test]
fn missing_source_root_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("dst");
    fs::create_dir(&dst).expect("create dst");

    let result = run_sync(
        &temp.path().join("no-such-src"),
        &dst,
        &SyncOptions::default(),
        None,
        &CancelFlag::new(),
    );
    assert!(matches!(result, Err(engine::EngineError::SourceWalk(_))));
}

#[test]
fn copy_failure_is_counted_and_does_not_abort_the_run() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("ok.txt"), b"fine");
    write(&src.join("blocked/file.txt"), b"unreachable");
    fs::create_dir(&dst).expect("create dst");
    // A file at the parent path makes this subtree uncopyable.
    write(&dst.join("blocked"), b"i am a file");

    let summary =
        run_sync(&src, &dst, &SyncOptions::default(), None, &CancelFlag::new()).expect("sync");

    assert_eq!(summary.files_copied, 1);
    assert_eq!(summary.copy_failures, 1);
    assert_eq!(summary.errors(), 1);
    assert!(dst.join("ok.txt").exists());
}
