//! Path rebasing between the source and destination roots.
//!
//! The mapping strips the origin root component-wise and re-prefixes the
//! remainder with the other root. It performs no normalization; callers supply
//! already-absolute, normalized roots and only pass paths that were discovered
//! under the origin root. Under those preconditions the mapping is a bijection
//! between the two trees, so two distinct source files can never collide on
//! one destination path.

use std::path::{Path, PathBuf};

/// Returns `path` relative to `root` by dropping `root`'s leading components.
#[must_use]
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    let prefix_len = root.components().count();
    path.components().skip(prefix_len).collect()
}

/// Maps a path under `from_root` to its counterpart under `to_root`.
#[must_use]
pub fn rebase(path: &Path, from_root: &Path, to_root: &Path) -> PathBuf {
    to_root.join(relative_to(path, from_root))
}
