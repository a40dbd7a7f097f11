#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `metadata` applies ownership and permission metadata to destination files
//! and directories after their content has been written. The crate owns the
//! "leave unchanged" sentinel semantics of `--chown`: an [`Ownership`] carries
//! an optional numeric uid and gid, and absent fields are never touched on the
//! filesystem.
//!
//! # Design
//!
//! - [`Ownership`] is resolved once, before any tasks are created, and shared
//!   read-only by every worker.
//! - [`apply_ownership`] changes the owning user and the owning group in two
//!   independent steps so a failure applying one never disturbs the other.
//! - [`copy_permissions`] transfers the source permission bits onto the
//!   destination, used when `--attribute` is enabled.
//! - Ownership application is a no-op outside Unix; permission copying uses
//!   the portable [`std::fs`] surface everywhere.
//!
//! # Errors
//!
//! All operations surface [`MetadataError`], naming the affected path and the
//! underlying OS error. Callers treat these as per-file failures: logged and
//! counted, never fatal to the run.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

#[cfg(unix)]
mod ownership;
#[cfg(not(unix))]
mod ownership_stub;

#[cfg(unix)]
use ownership as imp;
#[cfg(not(unix))]
use ownership_stub as imp;

/// Resolved numeric identity applied to destination entries.
///
/// `None` fields are the sentinel for "do not change", matching the `-1`
/// convention of `chown(2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ownership {
    uid: Option<u32>,
    gid: Option<u32>,
}

impl Ownership {
    /// Creates an identity from optional numeric ids.
    #[must_use]
    pub const fn new(uid: Option<u32>, gid: Option<u32>) -> Self {
        Self { uid, gid }
    }

    /// Numeric owner id, if one should be applied.
    #[must_use]
    pub const fn uid(&self) -> Option<u32> {
        self.uid
    }

    /// Numeric group id, if one should be applied.
    #[must_use]
    pub const fn gid(&self) -> Option<u32> {
        self.gid
    }

    /// Whether applying this identity would change nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.uid, self.gid) {
            (Some(uid), Some(gid)) => write!(f, "{uid}:{gid}"),
            (Some(uid), None) => write!(f, "{uid}:-"),
            (None, Some(gid)) => write!(f, "-:{gid}"),
            (None, None) => f.write_str("-:-"),
        }
    }
}

/// Error applying metadata to a destination entry.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Changing the owning user failed.
    #[error("failed to set owner of '{}': {source}", path.display())]
    SetOwner {
        /// Destination path that could not be updated.
        path: std::path::PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Changing the owning group failed.
    #[error("failed to set group of '{}': {source}", path.display())]
    SetGroup {
        /// Destination path that could not be updated.
        path: std::path::PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Copying permission bits failed.
    #[error("failed to set permissions of '{}': {source}", path.display())]
    SetPermissions {
        /// Destination path that could not be updated.
        path: std::path::PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
}

/// Applies the owner id and then the group id to `path`, independently.
///
/// Each present field is applied with the other left unchanged, mirroring
/// `chown(path, uid, -1)` followed by `chown(path, -1, gid)`. Sentinel-only
/// identities return immediately without touching the filesystem.
pub fn apply_ownership(path: &Path, ownership: &Ownership) -> Result<(), MetadataError> {
    if let Some(uid) = ownership.uid() {
        imp::chown(path, Some(uid), None).map_err(|source| MetadataError::SetOwner {
            path: path.to_path_buf(),
            source,
        })?;
    }
    if let Some(gid) = ownership.gid() {
        imp::chown(path, None, Some(gid)).map_err(|source| MetadataError::SetGroup {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Copies the permission bits recorded in `source` onto `destination`.
pub fn copy_permissions(
    destination: &Path,
    source: &fs::Metadata,
) -> Result<(), MetadataError> {
    fs::set_permissions(destination, source.permissions()).map_err(|source| {
        MetadataError::SetPermissions {
            path: destination.to_path_buf(),
            source,
        }
    })
}
