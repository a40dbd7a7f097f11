#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` is the synchronization core of `dirsync`. Given a source root and
//! a destination root, it enumerates both trees, decides per file whether a
//! copy is needed, performs the copies across a bounded worker pool, optionally
//! reconciles deletions before and/or after the copy phase, and finishes with a
//! directory-only ownership sweep when an identity was supplied.
//!
//! # Design
//!
//! - [`mapper`] rebases paths between the two roots; the mapping is a pure,
//!   collision-free prefix substitution.
//! - [`detect`] implements change detection: existence-only by default, or a
//!   streamed content digest in hash-check mode.
//! - [`copy`] transfers one file in fixed-size chunks, creating parent
//!   directories idempotently and applying permission and ownership metadata
//!   after the content is written.
//! - [`delete`] removes destination files absent from the source and prunes
//!   directories the deletions emptied.
//! - [`sync`] orchestrates the phases and folds per-task outcomes into a
//!   [`SyncSummary`] of structured counters.
//!
//! # Invariants
//!
//! - Re-running a sync with identical configuration is idempotent: files that
//!   are already correct are skipped, never rewritten in existence mode.
//! - No failure inside a single file's task crosses the pool boundary; it is
//!   logged, counted, and the run continues.
//! - Phases are strictly ordered: enumeration completes before copying starts,
//!   copying completes before a post-delete phase, and all deletions complete
//!   before the ownership sweep.

pub mod copy;
pub mod delete;
pub mod detect;
mod error;
pub mod mapper;
mod progress;
pub mod sync;

pub use checksums::HashAlgorithm;
pub use copy::{COPY_BUFFER_SIZE, CopyError, CopyOptions};
pub use delete::ReconcileOutcome;
pub use detect::ChangeDetection;
pub use error::{EngineError, EngineResult};
pub use metadata::Ownership;
pub use progress::ProgressSink;
pub use sync::{CancelFlag, SyncOptions, SyncSummary, run_sync};
