//! Content addressing for site directories.
//!
//! A [`Snapshot`] records every file under a directory together with the digest of its content.
//! The digest, not the path or modification time, is what decides whether a file has to be sent
//! to the hosting provider again.

// this is similar to what Netlify does as part of their deploy see
// https://github.com/netlify/cli/blob/main/src/utils/deploy/hash-files.mjs#L10.

use std::path::PathBuf;

use thiserror::Error;

pub mod hash;
pub mod snapshot;

pub use hash::{Hash, HashParseError, Hasher};
pub use snapshot::{FileRecord, Snapshot};

#[remain::sorted]
#[derive(Debug, Error)]
pub enum CasError {
    /// Error that occurs when a snapshot is requested for something other than a directory
    #[error("Invalid snapshot root. {0} must be a directory")]
    InvalidSnapshotRoot(PathBuf),

    /// Error that may occur while I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type CasResult<T> = Result<T, CasError>;
