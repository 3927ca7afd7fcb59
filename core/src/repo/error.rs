use std::path::PathBuf;

use thiserror::Error;

use crate::object::{Id, ParseIdError};

/// Describes the potential error conditions that might arise from oxgit operations.
///
/// Every error is terminal for the operation that raised it. Nothing in the
/// core retries; callers decide how to report.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad magic number or otherwise unusable header on an object,
    /// index, pack, or pack index.
    #[error("invalid {what} header: {detail}")]
    InvalidHeader { what: &'static str, detail: String },

    #[error("unsupported {what} version {version}")]
    UnsupportedVersion { what: &'static str, version: u32 },

    /// The content read back for an object does not hash to the requested ID.
    #[error("object {expected} is corrupt (content hashes to {actual})")]
    Integrity { expected: Id, actual: Id },

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    #[error("object declares {declared} bytes but contains {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("pack files larger than 2 GiB are not supported")]
    UnsupportedPackSize,

    #[error("{0} pack entries are not supported")]
    UnsupportedDeltaKind(&'static str),

    #[error("delta entry at offset {offset} refers to unknown base at offset {base_offset}")]
    DeltaBaseNotFound { offset: u64, base_offset: u64 },

    #[error("object {0} not found")]
    ObjectNotFound(Id),

    #[error("index checksum mismatch (expected {expected}, found {actual})")]
    IndexChecksum { expected: Id, actual: Id },

    #[error("{what} checksum mismatch (expected {expected}, found {actual})")]
    PackChecksum {
        what: &'static str,
        expected: Id,
        actual: Id,
    },

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("working directory {0} doesn't exist")]
    WorkDirDoesntExist(PathBuf),

    #[error("not a git repository: {0} doesn't exist")]
    GitDirDoesntExist(PathBuf),

    #[error("git directory {0} already exists")]
    GitDirShouldntExist(PathBuf),

    #[error("path {0} is outside of the working directory")]
    PathOutsideWorkDir(PathBuf),

    #[error("path {0} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error(transparent)]
    InvalidId(#[from] ParseIdError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// A specialized `Result` type for oxgit operations.
pub type Result<T> = std::result::Result<T, Error>;
