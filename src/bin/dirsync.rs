#![deny(unsafe_code)]

use std::process::ExitCode;
use std::{env, io};

fn main() -> ExitCode {
    // Holding the stdout/stderr locks for the whole run deadlocks the tracing
    // subscriber, which also writes to stderr from the copy worker threads.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let code = cli::run(env::args_os(), &mut stdout, &mut stderr);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
