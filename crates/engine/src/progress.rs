//! Byte-level progress reporting interface.

use std::path::Path;

/// Receives incremental per-file transfer progress.
///
/// Implementations are shared read-only across copy workers, so they must be
/// thread safe. The engine calls [`ProgressSink::update`] after every chunk it
/// writes (and exactly once for an empty file) with the bytes written so far
/// out of the file's total size; `so_far == total` marks the file complete.
pub trait ProgressSink: Send + Sync {
    /// Reports that `so_far` of `total` bytes of `label` have been written.
    fn update(&self, label: &Path, total: u64, so_far: u64);
}
