//! Resolution of `USER:GROUP` specifications to numeric identities.
//!
//! Resolution happens exactly once, before any tasks are created; the engine
//! only ever sees the resolved [`Ownership`]. An empty field means "leave
//! unchanged" (`--chown alice:` changes the owner only), raw numeric ids are
//! accepted as-is, and unknown names are a hard error surfaced before any work
//! starts.

use std::fmt;

use engine::Ownership;

/// Error resolving a `USER:GROUP` specification.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// More than one `:` separator, or nothing to resolve at all.
    Malformed(String),
    /// The user name is not known to the system.
    UnknownUser(String),
    /// The group name is not known to the system.
    UnknownGroup(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(spec) => {
                write!(f, "'{spec}' is not a USER:GROUP specification")
            }
            Self::UnknownUser(name) => write!(f, "unknown user '{name}'"),
            Self::UnknownGroup(name) => write!(f, "unknown group '{name}'"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves a `USER:GROUP` (or bare `USER`) string to numeric ids.
pub fn resolve_ownership(spec: &str) -> Result<Ownership, ResolveError> {
    let mut parts = spec.splitn(3, ':');
    let user = parts.next().unwrap_or("");
    let group = parts.next();
    if parts.next().is_some() {
        return Err(ResolveError::Malformed(spec.to_string()));
    }

    let uid = match user {
        "" => None,
        name => Some(resolve_user(name)?),
    };
    let gid = match group {
        None | Some("") => None,
        Some(name) => Some(resolve_group(name)?),
    };
    if uid.is_none() && gid.is_none() {
        return Err(ResolveError::Malformed(spec.to_string()));
    }
    Ok(Ownership::new(uid, gid))
}

fn resolve_user(name: &str) -> Result<u32, ResolveError> {
    if let Ok(uid) = name.parse::<u32>() {
        return Ok(uid);
    }
    lookup_user(name).ok_or_else(|| ResolveError::UnknownUser(name.to_string()))
}

fn resolve_group(name: &str) -> Result<u32, ResolveError> {
    if let Ok(gid) = name.parse::<u32>() {
        return Ok(gid);
    }
    lookup_group(name).ok_or_else(|| ResolveError::UnknownGroup(name.to_string()))
}

#[cfg(unix)]
fn lookup_user(name: &str) -> Option<u32> {
    uzers::get_user_by_name(name).map(|user| user.uid())
}

#[cfg(unix)]
fn lookup_group(name: &str) -> Option<u32> {
    uzers::get_group_by_name(name).map(|group| group.gid())
}

#[cfg(not(unix))]
fn lookup_user(_name: &str) -> Option<u32> {
    None
}

#[cfg(not(unix))]
fn lookup_group(_name: &str) -> Option<u32> {
    None
}
