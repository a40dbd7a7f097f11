//! End-to-end tests driving the `dirsync` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn dirsync() -> Command {
    Command::cargo_bin("dirsync").expect("binary builds")
}

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

#[test]
fn mirrors_a_tree_into_an_empty_destination() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("x.txt"), b"ten bytes!");
    write(&src.join("sub/y.txt"), b"");
    fs::create_dir(&dst).expect("create dst");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(&dst)
        .assert()
        .success();

    assert_eq!(fs::read(dst.join("x.txt")).expect("read"), b"ten bytes!");
    assert_eq!(
        fs::metadata(dst.join("sub/y.txt")).expect("metadata").len(),
        0
    );
}

#[test]
fn hash_check_rerun_leaves_destination_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("x.txt"), b"stable content");
    fs::create_dir(&dst).expect("create dst");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(&dst)
        .assert()
        .success();
    let first_modified = fs::metadata(dst.join("x.txt"))
        .expect("metadata")
        .modified()
        .expect("mtime");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(&dst)
        .arg("--hash-chk")
        .assert()
        .success();
    let second_modified = fs::metadata(dst.join("x.txt"))
        .expect("metadata")
        .modified()
        .expect("mtime");

    assert_eq!(first_modified, second_modified);
}

#[test]
fn delete_flag_removes_files_missing_from_source() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("a.txt"), b"a");
    write(&dst.join("a.txt"), b"a");
    write(&dst.join("only-here/c.txt"), b"c");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(&dst)
        .arg("--delete")
        .assert()
        .success();

    assert!(dst.join("a.txt").exists());
    assert!(!dst.join("only-here").exists());
}

#[cfg(unix)]
#[test]
fn attribute_flag_preserves_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    write(&src.join("script.sh"), b"#!/bin/sh\n");
    fs::set_permissions(src.join("script.sh"), fs::Permissions::from_mode(0o755))
        .expect("chmod");
    fs::create_dir(&dst).expect("create dst");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(&dst)
        .arg("--attribute")
        .assert()
        .success();

    let mode = fs::metadata(dst.join("script.sh"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn missing_source_root_exits_nonzero_before_any_work() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("dst");
    fs::create_dir(&dst).expect("create dst");

    dirsync()
        .arg("--src")
        .arg(temp.path().join("missing"))
        .arg("--dst")
        .arg(&dst)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source folder"));
}

#[test]
fn missing_destination_root_exits_nonzero() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("src");
    fs::create_dir(&src).expect("create src");

    dirsync()
        .arg("--src")
        .arg(&src)
        .arg("--dst")
        .arg(temp.path().join("missing"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("destination folder"));
}

#[test]
fn version_flag_reports_the_package_version() {
    dirsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_the_supported_flags() {
    dirsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--hash-chk")
                .and(predicate::str::contains("--delete-after"))
                .and(predicate::str::contains("--chown")),
        );
}
