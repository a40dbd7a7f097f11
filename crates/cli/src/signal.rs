//! SIGINT wiring.
//!
//! The handler only stores into an atomic flag, keeping it async-signal-safe;
//! the engine observes the flag between tasks and winds the run down.
#![allow(unsafe_code)]

use engine::CancelFlag;

#[cfg(unix)]
mod imp {
    use std::sync::OnceLock;

    use engine::CancelFlag;

    static FLAG: OnceLock<CancelFlag> = OnceLock::new();

    extern "C" fn handle_sigint(_signal: libc::c_int) {
        if let Some(flag) = FLAG.get() {
            flag.cancel();
        }
    }

    pub(super) fn install(flag: CancelFlag) {
        if FLAG.set(flag).is_err() {
            // Already installed; the existing flag stays authoritative.
            return;
        }
        let handler = handle_sigint as extern "C" fn(libc::c_int);
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use engine::CancelFlag;

    pub(super) fn install(_flag: CancelFlag) {}
}

/// Installs a SIGINT handler that cancels `flag`.
///
/// Installation happens at most once per process; later calls are ignored.
pub fn install(flag: CancelFlag) {
    imp::install(flag);
}
