//! End-to-end sync orchestration.
//!
//! A run moves through strictly ordered phases: enumerate, optional
//! pre-delete, parallel copy, optional post-delete, optional ownership sweep.
//! Tasks inside the copy phase are fully independent; the only cross-phase
//! state is the immutable configuration and the accumulated [`SyncSummary`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use walk::WalkBuilder;

use crate::copy::{self, CopyOptions};
use crate::delete;
use crate::detect::ChangeDetection;
use crate::error::{EngineError, EngineResult};
use crate::mapper;
use crate::progress::ProgressSink;
use metadata::Ownership;

/// Immutable configuration for one sync run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    /// How staleness of destination files is decided.
    pub detection: ChangeDetection,
    /// Reconcile deletions before the copy phase.
    pub delete_before: bool,
    /// Reconcile deletions after the copy phase.
    pub delete_after: bool,
    /// Preserve permission bits on copied files.
    pub preserve_permissions: bool,
    /// Identity applied to copied files and swept over directories.
    pub ownership: Ownership,
    /// Worker pool bound; `None` uses available parallelism.
    pub workers: Option<usize>,
}

/// Cooperative cancellation flag shared between the caller and the run.
///
/// Setting the flag stops new tasks from starting work; in-flight copies run
/// to completion and partially written files are left for the next run's
/// change detection.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Structured per-run counters.
///
/// Every swallowed per-file failure is observable here so callers and tests
/// can assert on counts instead of scraping log output.
#[derive(Clone, Debug, Default)]
pub struct SyncSummary {
    /// Regular files enumerated under the source root.
    pub files_scanned: usize,
    /// Files whose content was transferred.
    pub files_copied: usize,
    /// Files skipped because the destination was already current.
    pub files_up_to_date: usize,
    /// Files whose copy failed.
    pub copy_failures: usize,
    /// Total content bytes written.
    pub bytes_copied: u64,
    /// Destination files deleted by reconciliation.
    pub files_deleted: usize,
    /// Deletions that failed.
    pub delete_failures: usize,
    /// Empty directories pruned after deletions.
    pub dirs_pruned: usize,
    /// Source entries skipped due to enumeration errors.
    pub source_entries_skipped: usize,
    /// Destination entries skipped due to enumeration errors.
    pub destination_entries_skipped: usize,
    /// Directories the ownership sweep could not update.
    pub ownership_failures: usize,
    /// Whether the run was cut short by cancellation.
    pub interrupted: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SyncSummary {
    /// Total number of non-fatal failures swallowed during the run.
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.copy_failures + self.delete_failures + self.ownership_failures
    }
}

/// Outcome of one per-file task.
enum TaskOutcome {
    Copied(u64),
    UpToDate,
    Failed,
    Cancelled,
}

/// Drives one end-to-end sync of `source` into `destination`.
///
/// Relative roots are resolved against the current directory once, up front;
/// the walker yields absolute paths, so mapping, reconciliation, and the
/// ownership sweep all operate on the resolved roots.
///
/// Fatal errors are limited to enumeration of a root and worker-pool
/// construction; everything file-local is logged and counted in the returned
/// [`SyncSummary`].
pub fn run_sync(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
    progress: Option<&dyn ProgressSink>,
    cancel: &CancelFlag,
) -> EngineResult<SyncSummary> {
    let started = Instant::now();
    let mut summary = SyncSummary::default();

    info!(source = %source.display(), "reading source tree");
    let (source, src_files, src_skipped) =
        enumerate(source).map_err(EngineError::SourceWalk)?;
    summary.files_scanned = src_files.len();
    summary.source_entries_skipped = src_skipped;
    debug!(files = src_files.len(), "source enumeration complete");

    // The destination is only enumerated when a delete phase needs it, but
    // its root is always resolved so rebasing matches the absolute source
    // paths the walker produced.
    let (destination, dst_files) = if options.delete_before || options.delete_after {
        info!(destination = %destination.display(), "reading destination tree");
        let (root, files, skipped) =
            enumerate(destination).map_err(EngineError::DestinationWalk)?;
        summary.destination_entries_skipped = skipped;
        (root, files)
    } else {
        let root = resolve_root(destination).map_err(EngineError::DestinationWalk)?;
        (root, Vec::new())
    };

    if options.delete_before {
        record_reconcile(
            &mut summary,
            delete::remove_extraneous(&source, &destination, &src_files, &dst_files),
        );
    }

    copy_phase(
        &source,
        &destination,
        options,
        progress,
        cancel,
        &src_files,
        &mut summary,
    )?;

    if options.delete_after && !cancel.is_cancelled() {
        record_reconcile(
            &mut summary,
            delete::remove_extraneous(&source, &destination, &src_files, &dst_files),
        );
    }

    if !options.ownership.is_noop() && !cancel.is_cancelled() {
        sweep_directory_ownership(&destination, &options.ownership, &mut summary);
    }

    summary.interrupted = cancel.is_cancelled();
    summary.elapsed = started.elapsed();
    Ok(summary)
}

fn enumerate(root: &Path) -> Result<(PathBuf, Vec<PathBuf>, usize), walk::WalkError> {
    let mut walker = WalkBuilder::new(root).build()?;
    let root = walker.root().to_path_buf();
    let mut files = Vec::new();
    for path in walker.by_ref() {
        files.push(path);
    }
    Ok((root, files, walker.skipped_entries()))
}

/// Resolves a root the same way enumeration would, without iterating it.
fn resolve_root(root: &Path) -> Result<PathBuf, walk::WalkError> {
    Ok(WalkBuilder::new(root).build()?.root().to_path_buf())
}

fn record_reconcile(summary: &mut SyncSummary, outcome: delete::ReconcileOutcome) {
    summary.files_deleted += outcome.deleted;
    summary.delete_failures += outcome.failed;
    summary.dirs_pruned += outcome.pruned_dirs;
}

fn copy_phase(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
    progress: Option<&dyn ProgressSink>,
    cancel: &CancelFlag,
    src_files: &[PathBuf],
    summary: &mut SyncSummary,
) -> EngineResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.unwrap_or(0))
        .build()
        .map_err(EngineError::ThreadPool)?;

    let copy_options = CopyOptions {
        preserve_permissions: options.preserve_permissions,
        ownership: options.ownership,
    };

    let outcomes: Vec<TaskOutcome> = pool.install(|| {
        src_files
            .par_iter()
            .map(|src_file| {
                process_file(
                    src_file,
                    source,
                    destination,
                    options.detection,
                    &copy_options,
                    progress,
                    cancel,
                )
            })
            .collect()
    });

    for outcome in outcomes {
        match outcome {
            TaskOutcome::Copied(bytes) => {
                summary.files_copied += 1;
                summary.bytes_copied += bytes;
            }
            TaskOutcome::UpToDate => summary.files_up_to_date += 1,
            TaskOutcome::Failed => summary.copy_failures += 1,
            TaskOutcome::Cancelled => {}
        }
    }
    Ok(())
}

/// One unit of concurrent work: change detection followed by the copy.
fn process_file(
    src_file: &Path,
    source: &Path,
    destination: &Path,
    detection: ChangeDetection,
    copy_options: &CopyOptions,
    progress: Option<&dyn ProgressSink>,
    cancel: &CancelFlag,
) -> TaskOutcome {
    if cancel.is_cancelled() {
        return TaskOutcome::Cancelled;
    }

    let dst_file = mapper::rebase(src_file, source, destination);
    if !detection.needs_copy(src_file, &dst_file) {
        debug!(path = %dst_file.display(), "destination up to date");
        return TaskOutcome::UpToDate;
    }

    match copy::copy_file(src_file, &dst_file, copy_options, progress) {
        Ok(bytes) => {
            info!("{} => {}", src_file.display(), dst_file.display());
            TaskOutcome::Copied(bytes)
        }
        Err(err) => {
            error!(
                source = %src_file.display(),
                destination = %dst_file.display(),
                error = %err,
                "copy failed"
            );
            TaskOutcome::Failed
        }
    }
}

/// Applies `ownership` to every directory under `root`.
///
/// This is the final, directory-only pass; files were already chowned by the
/// copy executor as they were written. The root itself is left untouched.
fn sweep_directory_ownership(root: &Path, ownership: &Ownership, summary: &mut SyncSummary) {
    debug!(root = %root.display(), %ownership, "applying ownership to directories");
    sweep_dir(root, ownership, summary);
}

fn sweep_dir(dir: &Path, ownership: &Ownership, summary: &mut SyncSummary) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "cannot read directory during ownership sweep");
            summary.ownership_failures += 1;
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        if let Err(err) = metadata::apply_ownership(&path, ownership) {
            warn!(path = %path.display(), error = %err, "ownership sweep failed");
            summary.ownership_failures += 1;
        } else {
            debug!(path = %path.display(), %ownership, "ownership applied");
        }
        sweep_dir(&path, ownership, summary);
    }
}
