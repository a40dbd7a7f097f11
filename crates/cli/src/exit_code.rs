//! Process exit codes.

/// Exit codes reported by the `dirsync` binary.
///
/// A run that reaches completion exits [`ExitCode::Ok`] even when individual
/// files failed; those failures are logged and counted instead. User
/// interruption also exits zero once outstanding work has been wound down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,
    /// Command-line arguments were invalid or could not be resolved.
    Syntax = 1,
    /// The source or destination root does not exist or is not a directory.
    FileSelect = 3,
}

impl ExitCode {
    /// Numeric process exit status.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}
