//! Unix `chown` plumbing.
//!
//! Raw id construction requires `unsafe` because rustix cannot verify that a
//! caller-supplied integer denotes a live account; the ids here come straight
//! from name resolution or the command line, matching `chown(2)` semantics.
#![allow(unsafe_code)]

use std::io;
use std::path::Path;

use rustix::fs::{Gid, Uid};

pub(crate) fn chown(path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
    let owner = uid.map(|raw| unsafe { Uid::from_raw(raw) });
    let group = gid.map(|raw| unsafe { Gid::from_raw(raw) });
    rustix::fs::chown(path, owner, group).map_err(io::Error::from)
}
