//! Deletion reconciliation.
//!
//! Computes the destination files whose root-relative path has no source
//! counterpart, removes them, and prunes the directories those deletions left
//! empty. Every individual failure is logged and counted; reconciliation never
//! aborts on one bad entry.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::mapper;

/// Structured result of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Destination files removed.
    pub deleted: usize,
    /// Files that could not be removed (permissions, I/O).
    pub failed: usize,
    /// Directories removed because the deletions emptied them.
    pub pruned_dirs: usize,
}

/// Deletes destination files absent from the source, then prunes empty
/// directories under `dst_root`.
///
/// Both file sets must be complete enumerations of their respective trees.
/// Files that vanished between enumeration and deletion are skipped silently;
/// they are already in the desired state.
pub fn remove_extraneous(
    src_root: &Path,
    dst_root: &Path,
    src_files: &[PathBuf],
    dst_files: &[PathBuf],
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    let source_set: HashSet<PathBuf> = src_files
        .iter()
        .map(|path| mapper::relative_to(path, src_root))
        .collect();

    for dst_file in dst_files {
        let relative = mapper::relative_to(dst_file, dst_root);
        if source_set.contains(&relative) {
            continue;
        }
        match fs::remove_file(dst_file) {
            Ok(()) => {
                info!(path = %dst_file.display(), "deleted file not in source");
                outcome.deleted += 1;
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %dst_file.display(), "file already gone");
            }
            Err(error) => {
                warn!(path = %dst_file.display(), %error, "failed to delete file");
                outcome.failed += 1;
            }
        }
    }

    outcome.pruned_dirs = prune_empty_dirs(dst_root);
    outcome
}

/// Removes empty directories below `root`, bottom-up.
///
/// The walk is post-order so removing a child can empty its parent within the
/// same pass. The root itself is never removed. Returns the number of
/// directories pruned; directories that cannot be read or removed are logged
/// and left in place.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut pruned = 0;
    prune_children(root, &mut pruned);
    pruned
}

/// Prunes empty descendants of `dir` and reports whether `dir` ended up empty.
fn prune_children(dir: &Path, pruned: &mut usize) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(path = %dir.display(), %error, "cannot read directory while pruning");
            return false;
        }
    };

    let mut empty = true;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(path = %dir.display(), %error, "cannot read entry while pruning");
                empty = false;
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && prune_children(&path, pruned) {
            match fs::remove_dir(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "removed empty directory");
                    *pruned += 1;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to remove empty directory");
                    empty = false;
                }
            }
        } else {
            empty = false;
        }
    }
    empty
}
