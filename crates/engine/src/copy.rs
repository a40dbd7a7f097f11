//! Single-file copy execution.
//!
//! A copy transfers content in fixed [`COPY_BUFFER_SIZE`] chunks, then applies
//! permission bits and ownership per the configured options. Metadata is
//! always applied after the content is fully written.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use metadata::{MetadataError, Ownership};

use crate::progress::ProgressSink;

/// Fixed chunk size for content transfer and progress accounting.
pub const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Per-file copy configuration, resolved once per run.
#[derive(Clone, Copy, Debug, Default)]
pub struct CopyOptions {
    /// Copy the source's permission bits onto the destination.
    pub preserve_permissions: bool,
    /// Identity to apply to the destination file; sentinel fields untouched.
    pub ownership: Ownership,
}

/// Failure copying one file. Task-local: logged and counted, never fatal.
#[derive(Debug)]
pub enum CopyError {
    /// Content transfer or directory creation failed.
    Io(io::Error),
    /// The content was written but metadata application failed.
    Metadata(MetadataError),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "{error}"),
            Self::Metadata(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CopyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Metadata(error) => Some(error),
        }
    }
}

impl From<io::Error> for CopyError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<MetadataError> for CopyError {
    fn from(error: MetadataError) -> Self {
        Self::Metadata(error)
    }
}

/// Copies `source` to `destination`, returning the number of bytes written.
///
/// The destination's parent directories are created first; racing sibling
/// tasks may create the same parent concurrently, which is not an error. When
/// a progress sink is supplied it observes every chunk written.
pub fn copy_file(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
    progress: Option<&dyn ProgressSink>,
) -> Result<u64, CopyError> {
    if let Some(parent) = destination.parent() {
        ensure_directory(parent)?;
    }

    let mut reader = File::open(source)?;
    let source_metadata = reader.metadata()?;
    let total = source_metadata.len();
    let mut writer = File::create(destination)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written: u64 = 0;
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read])?;
        written += read as u64;
        if let Some(sink) = progress {
            sink.update(destination, total, written);
        }
    }
    if total == 0 {
        if let Some(sink) = progress {
            sink.update(destination, 0, 0);
        }
    }
    drop(writer);

    if options.preserve_permissions {
        metadata::copy_permissions(destination, &source_metadata)?;
    }
    metadata::apply_ownership(destination, &options.ownership)?;

    Ok(written)
}

/// Creates `path` and its ancestors, tolerating concurrent creation.
///
/// `create_dir_all` can lose a race against a sibling worker and surface
/// `AlreadyExists`; that outcome is success as long as a directory ends up at
/// the path. A pre-existing non-directory entry remains an error.
fn ensure_directory(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(error) => Err(error),
    }
}
