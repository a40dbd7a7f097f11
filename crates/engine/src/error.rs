//! Common error types for the engine crate.

use std::fmt;

use walk::WalkError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal errors that abort a sync run before or between phases.
///
/// Per-file failures are deliberately absent: those are logged and counted in
/// the run summary instead of being propagated.
#[derive(Debug)]
pub enum EngineError {
    /// The source tree could not be enumerated.
    SourceWalk(WalkError),
    /// The destination tree could not be enumerated.
    DestinationWalk(WalkError),
    /// The worker pool could not be constructed.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceWalk(error) => write!(f, "source enumeration failed: {error}"),
            Self::DestinationWalk(error) => {
                write!(f, "destination enumeration failed: {error}")
            }
            Self::ThreadPool(error) => write!(f, "failed to build worker pool: {error}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceWalk(error) | Self::DestinationWalk(error) => Some(error),
            Self::ThreadPool(error) => Some(error),
        }
    }
}
