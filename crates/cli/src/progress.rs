//! Terminal progress rendering.

use std::io::{self, Write};
use std::path::Path;

use engine::ProgressSink;

const LABEL_WIDTH: usize = 60;

/// Renders per-file byte progress in place on stderr.
///
/// Each update rewrites the current line; the line is terminated once the
/// file completes. With several workers active, lines from different files
/// interleave, which matches the per-chunk reporting contract.
#[derive(Debug, Default)]
pub struct TerminalProgress;

impl TerminalProgress {
    /// Creates a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&self, label: &Path, total: u64, so_far: u64) {
        let mut stderr = io::stderr().lock();
        let name = shorten(&label.display().to_string());
        let percent = if total == 0 {
            100
        } else {
            so_far.saturating_mul(100) / total
        };
        let _ = write!(stderr, "\r{name:<LABEL_WIDTH$} {so_far:>13}/{total:<13} {percent:>3}%");
        if so_far >= total {
            let _ = writeln!(stderr);
        }
    }
}

/// Keeps the tail of over-long labels so the interesting suffix stays visible.
fn shorten(label: &str) -> String {
    if label.len() <= LABEL_WIDTH {
        return label.to_string();
    }
    let tail_start = label
        .char_indices()
        .rev()
        .map(|(index, _)| index)
        .take(LABEL_WIDTH - 3)
        .last()
        .unwrap_or(0);
    format!("...{}", &label[tail_start..])
}
