#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the streaming content digests behind `dirsync`'s
//! `--hash-chk` change detection. Two files are considered equal iff their
//! digests match bit-for-bit; the digest algorithm is a pluggable strategy
//! selected once at configuration time rather than branched on at call sites.
//!
//! # Design
//!
//! - [`HashAlgorithm`] names the available strategies (`md5`, `sha256`) and
//!   constructs the corresponding [`DynDigest`] state.
//! - [`hash_file`] streams a file through a digest in fixed [`CHUNK_SIZE`]
//!   chunks, bounding peak memory regardless of file size.
//! - [`files_match`] compares two files and deliberately never fails: a file
//!   that is missing or unreadable on either side makes the pair "differ",
//!   which downstream logic treats as "copy required".
//!
//! # Invariants
//!
//! - Digest state never aliases between comparisons; each call builds fresh
//!   hashers.
//! - [`files_match`] returns `false` rather than raising for every I/O
//!   failure mode.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use digest::DynDigest;
use md5::Md5;
use sha2::Sha256;
use tracing::debug;

/// Fixed read chunk used when streaming file contents through a digest.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Digest strategy used for content comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// 128-bit MD5, the historical default for folder comparison.
    #[default]
    Md5,
    /// 256-bit SHA-2, for callers that want a cryptographic margin.
    Sha256,
}

impl HashAlgorithm {
    /// Constructs a fresh digest state for this strategy.
    #[must_use]
    pub fn new_digest(self) -> Box<dyn DynDigest> {
        match self {
            Self::Md5 => Box::new(Md5::default()),
            Self::Sha256 => Box::new(Sha256::default()),
        }
    }

    /// Canonical flag-value spelling of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            other => Err(UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Error produced when parsing an unsupported algorithm name.
#[derive(Debug)]
pub struct UnknownAlgorithm(String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hash algorithm '{}' (expected md5 or sha256)", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

/// Computes the digest of a file by streaming it in [`CHUNK_SIZE`] chunks.
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut hasher = algorithm.new_digest();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Reports whether two files have bit-identical content under `algorithm`.
///
/// Never raises: a missing or unreadable file on either side yields `false`,
/// which callers interpret as "the destination must be rewritten".
#[must_use]
pub fn files_match(algorithm: HashAlgorithm, a: &Path, b: &Path) -> bool {
    let digest_a = match hash_file(algorithm, a) {
        Ok(digest) => digest,
        Err(error) => {
            debug!(path = %a.display(), %error, "treating unreadable file as changed");
            return false;
        }
    };
    let digest_b = match hash_file(algorithm, b) {
        Ok(digest) => digest,
        Err(error) => {
            debug!(path = %b.display(), %error, "treating unreadable file as changed");
            return false;
        }
    };
    digest_a == digest_b
}
