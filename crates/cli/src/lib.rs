#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the thin command-line front-end for `dirsync`. It recognises the
//! supported switches (`--src`, `--dst`, `--hash-chk`, `--hash-algo`,
//! `--delete`, `--delete-after`, `--chown`, `--progress`, `--attribute`,
//! `--workers`, `--verbose`, `--version`), validates both roots before any
//! work starts, resolves `USER:GROUP` to a numeric identity exactly once, and
//! delegates the run to [`engine::run_sync`].
//!
//! # Design
//!
//! - [`run`] accepts an iterator of arguments together with handles for
//!   standard output and error and returns the process exit code, so the
//!   binary wrapper stays a one-liner and tests can drive the front-end
//!   in-process.
//! - Logging goes through `tracing`; `--verbose` raises the default level
//!   from `info` to `debug` and `RUST_LOG` overrides both.
//! - Global side effects are limited to the logging subscriber and the SIGINT
//!   handler; everything else is passed into the engine explicitly.
//!
//! # Invariants
//!
//! - `run` never panics; argument and validation failures surface as exit
//!   codes with a diagnostic on stderr.
//! - A run that reaches completion exits `0` even when individual files
//!   failed; per-file failures are logged and counted in the summary.
//! - Interruption via SIGINT stops new work, logs the cancellation, and exits
//!   `0` (the engine's idempotence makes re-invocation safe).

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command, value_parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engine::{
    CancelFlag, ChangeDetection, HashAlgorithm, Ownership, ProgressSink, SyncOptions, run_sync,
};

mod exit_code;
mod progress;
mod resolve;
mod signal;

pub use exit_code::ExitCode;
pub use progress::TerminalProgress;
pub use resolve::{ResolveError, resolve_ownership};

/// Builds the clap command definition for `dirsync`.
fn command() -> Command {
    Command::new("dirsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Clone a source folder to a destination folder")
        .arg(
            Arg::new("src")
                .long("src")
                .value_name("DIR")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Source folder"),
        )
        .arg(
            Arg::new("dst")
                .long("dst")
                .value_name("DIR")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Destination folder"),
        )
        .arg(
            Arg::new("hash-chk")
                .long("hash-chk")
                .action(ArgAction::SetTrue)
                .help("Compare content digests when the destination file already exists"),
        )
        .arg(
            Arg::new("hash-algo")
                .long("hash-algo")
                .value_name("ALGO")
                .default_value("md5")
                .value_parser(parse_hash_algorithm)
                .help("Digest used by --hash-chk (md5 or sha256)"),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .action(ArgAction::SetTrue)
                .help("Remove destination files not in source before the copy phase"),
        )
        .arg(
            Arg::new("delete-after")
                .long("delete-after")
                .action(ArgAction::SetTrue)
                .help("Remove destination files not in source after the copy phase"),
        )
        .arg(
            Arg::new("chown")
                .long("chown")
                .value_name("USER:GROUP")
                .help("Apply this ownership to copied files and destination directories"),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .action(ArgAction::SetTrue)
                .help("Show per-file byte progress during transfer"),
        )
        .arg(
            Arg::new("attribute")
                .long("attribute")
                .action(ArgAction::SetTrue)
                .help("Preserve permission bits of copied files"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .value_parser(clap::builder::RangedU64ValueParser::<usize>::new().range(1..))
                .help("Bound the copy worker pool (default: available parallelism)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Verbose mode"),
        )
}

fn parse_hash_algorithm(value: &str) -> Result<HashAlgorithm, String> {
    value.parse::<HashAlgorithm>().map_err(|error| error.to_string())
}

/// Runs the front-end and returns the process exit code.
pub fn run<I, T>(args: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{error}");
                    ExitCode::Ok.as_i32()
                }
                _ => {
                    let _ = write!(stderr, "{error}");
                    ExitCode::Syntax.as_i32()
                }
            };
        }
    };

    init_logging(matches.get_flag("verbose"));

    let (Some(source), Some(destination)) = (
        matches.get_one::<PathBuf>("src"),
        matches.get_one::<PathBuf>("dst"),
    ) else {
        return ExitCode::Syntax.as_i32();
    };

    if !source.is_dir() {
        let _ = writeln!(
            stderr,
            "dirsync: source folder '{}' does not exist",
            source.display()
        );
        return ExitCode::FileSelect.as_i32();
    }
    if !destination.is_dir() {
        let _ = writeln!(
            stderr,
            "dirsync: destination folder '{}' does not exist",
            destination.display()
        );
        return ExitCode::FileSelect.as_i32();
    }

    let ownership = match matches.get_one::<String>("chown") {
        Some(spec) => match resolve_ownership(spec) {
            Ok(identity) => identity,
            Err(error) => {
                let _ = writeln!(stderr, "dirsync: --chown {spec}: {error}");
                return ExitCode::Syntax.as_i32();
            }
        },
        None => Ownership::default(),
    };

    let detection = if matches.get_flag("hash-chk") {
        let algorithm = matches
            .get_one::<HashAlgorithm>("hash-algo")
            .copied()
            .unwrap_or_default();
        ChangeDetection::Checksum(algorithm)
    } else {
        ChangeDetection::Existence
    };

    let options = SyncOptions {
        detection,
        delete_before: matches.get_flag("delete"),
        delete_after: matches.get_flag("delete-after"),
        preserve_permissions: matches.get_flag("attribute"),
        ownership,
        workers: matches.get_one::<usize>("workers").copied(),
    };

    let renderer = matches.get_flag("progress").then(TerminalProgress::new);
    let progress = renderer.as_ref().map(|sink| sink as &dyn ProgressSink);

    let cancel = CancelFlag::new();
    signal::install(cancel.clone());

    info!("starting the synchronization process");
    match run_sync(source, destination, &options, progress, &cancel) {
        Ok(summary) => {
            if summary.interrupted {
                info!("operation cancelled by user");
                return ExitCode::Ok.as_i32();
            }
            report(&summary);
            ExitCode::Ok.as_i32()
        }
        Err(error) => {
            let _ = writeln!(stderr, "dirsync: {error}");
            ExitCode::FileSelect.as_i32()
        }
    }
}

fn report(summary: &engine::SyncSummary) {
    info!(
        copied = summary.files_copied,
        up_to_date = summary.files_up_to_date,
        bytes = summary.bytes_copied,
        deleted = summary.files_deleted,
        pruned_dirs = summary.dirs_pruned,
        "transfer totals"
    );
    if summary.errors() > 0 {
        warn!(
            copy_failures = summary.copy_failures,
            delete_failures = summary.delete_failures,
            ownership_failures = summary.ownership_failures,
            "run completed with per-file failures"
        );
    }
    let elapsed = summary.elapsed.as_secs();
    info!(
        "the synchronization process has been completed after {} hours, {} minutes and {} seconds",
        elapsed / 3600,
        (elapsed % 3600) / 60,
        elapsed % 60
    );
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    // Later runs in the same process keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
