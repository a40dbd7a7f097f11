//! Per-file change detection.

use std::path::Path;

use checksums::HashAlgorithm;

/// Strategy deciding whether a destination file is missing or stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChangeDetection {
    /// Copy iff the destination path does not exist.
    ///
    /// Misses content changes behind a stable name, but never reads file
    /// contents; this is the fast default.
    #[default]
    Existence,
    /// Copy iff the destination is missing or its content digest differs.
    Checksum(HashAlgorithm),
}

impl ChangeDetection {
    /// Reports whether `source` must be copied onto `destination`.
    #[must_use]
    pub fn needs_copy(self, source: &Path, destination: &Path) -> bool {
        if !destination.exists() {
            return true;
        }
        match self {
            Self::Existence => false,
            Self::Checksum(algorithm) => !checksums::files_match(algorithm, source, destination),
        }
    }
}
