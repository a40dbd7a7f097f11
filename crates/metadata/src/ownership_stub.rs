//! Ownership application is a no-op on platforms without `chown`.

use std::io;
use std::path::Path;

use tracing::debug;

pub(crate) fn chown(path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
    debug!(
        path = %path.display(),
        ?uid,
        ?gid,
        "ownership application unsupported on this platform"
    );
    Ok(())
}
