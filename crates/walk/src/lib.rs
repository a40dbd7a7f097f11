#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates the regular files below a root directory for the
//! `dirsync` engine. The walker descends depth-first and yields absolute file
//! paths; directories are traversal structure, not entries. Directory contents
//! are sorted lexicographically before being visited so the sequence is
//! deterministic across platforms, even though downstream consumers only treat
//! the result as a set.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures traversal options such as whether directory
//!   symlinks may be followed.
//! - [`Walker`] implements [`Iterator`] over [`PathBuf`] values, one per
//!   regular file discovered.
//! - Enumeration is fault tolerant at entry granularity: an unreadable
//!   subdirectory or an entry whose metadata cannot be queried is logged at
//!   `warn` level and skipped while sibling traversal continues. The number of
//!   dropped entries is available through [`Walker::skipped_entries`]; a
//!   skipped directory counts once, regardless of what it contained.
//!
//! # Invariants
//!
//! - Yielded paths always reside under the configured root and never contain
//!   `..` segments introduced by the walker.
//! - Each regular file is yielded exactly once. When symlink following is
//!   enabled, canonical paths of visited directories are tracked so a symlink
//!   pointing back at an ancestor cannot loop the traversal.
//! - Iteration never panics; mid-walk filesystem failures degrade to skipped
//!   branches rather than errors.
//!
//! # Errors
//!
//! Only [`WalkBuilder::build`] returns [`WalkError`], and only when the root
//! itself cannot be inspected or read. Everything after a successful build is
//! log-and-continue.

use std::collections::HashSet;
use std::error::Error;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Configures a filesystem traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    follow_symlinks: bool,
}

impl WalkBuilder {
    /// Creates a new builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
        }
    }

    /// Configures whether directory symlinks should be descended into.
    ///
    /// Symlinks that resolve to regular files are always yielded; this option
    /// only controls descent into symlinked directories. Canonical paths are
    /// tracked to prevent infinite loops.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Builds a [`Walker`] using the configured options.
    ///
    /// Fails only when the root cannot be inspected or its top-level contents
    /// cannot be read; those are pre-flight conditions the caller is expected
    /// to surface before any work starts.
    pub fn build(self) -> Result<Walker, WalkError> {
        let root = absolutize(self.root)?;
        let metadata =
            fs::metadata(&root).map_err(|error| WalkError::root(root.clone(), error))?;
        if !metadata.is_dir() {
            return Err(WalkError::not_a_directory(root));
        }

        let mut walker = Walker {
            root: root.clone(),
            follow_symlinks: self.follow_symlinks,
            stack: Vec::new(),
            visited: HashSet::new(),
            skipped_entries: 0,
        };
        walker.remember_visited(&root);

        let state =
            DirectoryState::new(root.clone()).map_err(|error| WalkError::root(root, error))?;
        walker.stack.push(state);
        Ok(walker)
    }
}

/// Depth-first iterator over the regular files beneath a root.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    stack: Vec<DirectoryState>,
    visited: HashSet<PathBuf>,
    skipped_entries: usize,
}

impl Walker {
    /// Returns the absolute root this walker was built for.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of entries dropped because of mid-walk filesystem failures.
    ///
    /// An entry is a single directory child: an unreadable subdirectory
    /// counts once here no matter how many files it hid, and a file whose
    /// metadata cannot be queried also counts once. The count is cumulative
    /// and is normally read after the iterator has been exhausted.
    #[must_use]
    pub const fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }

    fn remember_visited(&mut self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(canonical) => self.visited.insert(canonical),
            // Canonicalization failures fall back to the literal path so the
            // branch is still walked at most once.
            Err(_) => self.visited.insert(path.to_path_buf()),
        }
    }

    fn skip_entry(&mut self, path: &Path, error: &io::Error) {
        self.skipped_entries += 1;
        warn!(path = %path.display(), %error, "skipping unreadable entry");
    }

    fn descend(&mut self, dir: PathBuf) {
        if !self.remember_visited(&dir) {
            return;
        }
        match DirectoryState::new(dir.clone()) {
            Ok(state) => self.stack.push(state),
            Err(error) => self.skip_entry(&dir, &error),
        }
    }
}

impl Iterator for Walker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let full_path = {
                let state = self.stack.last_mut()?;
                match state.next_name() {
                    Some(name) => state.path.join(name),
                    None => {
                        self.stack.pop();
                        continue;
                    }
                }
            };

            // fs::metadata follows symlinks, matching the underlying-walk
            // semantics the engine expects: a link to a file is a file.
            let metadata = match fs::metadata(&full_path) {
                Ok(metadata) => metadata,
                Err(error) => {
                    self.skip_entry(&full_path, &error);
                    continue;
                }
            };

            if metadata.is_dir() {
                let is_link = fs::symlink_metadata(&full_path)
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if !is_link || self.follow_symlinks {
                    self.descend(full_path);
                }
                continue;
            }

            if metadata.is_file() {
                return Some(full_path);
            }
            // Sockets, FIFOs, and device nodes are not mirrored.
        }
    }
}

#[derive(Debug)]
struct DirectoryState {
    path: PathBuf,
    entries: Vec<OsString>,
    index: usize,
}

impl DirectoryState {
    fn new(path: PathBuf) -> io::Result<Self> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&path)? {
            entries.push(entry?.file_name());
        }
        entries.sort();
        Ok(Self {
            path,
            entries,
            index: 0,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        let name = self.entries.get(self.index)?.clone();
        self.index += 1;
        Some(name)
    }
}

/// Error returned when a walker cannot be built for a root.
#[derive(Debug)]
pub struct WalkError {
    kind: WalkErrorKind,
}

impl WalkError {
    fn root(path: PathBuf, source: io::Error) -> Self {
        Self {
            kind: WalkErrorKind::Root { path, source },
        }
    }

    fn not_a_directory(path: PathBuf) -> Self {
        Self {
            kind: WalkErrorKind::NotADirectory { path },
        }
    }

    /// Returns the specific failure that prevented traversal.
    #[must_use]
    pub fn kind(&self) -> &WalkErrorKind {
        &self.kind
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WalkErrorKind::Root { path, source } => {
                write!(
                    f,
                    "failed to read traversal root '{}': {}",
                    path.display(),
                    source
                )
            }
            WalkErrorKind::NotADirectory { path } => {
                write!(f, "traversal root '{}' is not a directory", path.display())
            }
        }
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            WalkErrorKind::Root { source, .. } => Some(source),
            WalkErrorKind::NotADirectory { .. } => None,
        }
    }
}

/// Classification of walker construction failures.
#[derive(Debug)]
pub enum WalkErrorKind {
    /// The root could not be inspected or read.
    Root {
        /// Root path that failed.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// The root exists but is not a directory.
    NotADirectory {
        /// Offending root path.
        path: PathBuf,
    },
}

fn absolutize(path: PathBuf) -> Result<PathBuf, WalkError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = std::env::current_dir()
            .map_err(|error| WalkError::root(PathBuf::from("."), error))?;
        Ok(cwd.join(path))
    }
}
