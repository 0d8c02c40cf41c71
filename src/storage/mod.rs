//! Storage module for persisting fetched artifacts
//!
//! Artifacts are written under `root/<item directory>/<file name>`. A write
//! never replaces an existing file: when the target name is taken, a short
//! random suffix is appended until a free name is found.

mod fs;

pub use fs::FsStorage;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting an artifact
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No free file name found for {}", .path.display())]
    CollisionsExhausted { path: PathBuf },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result of a persist call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Bytes were written at this path (which may carry a collision suffix)
    Written(PathBuf),

    /// Nothing was written because there was no content
    Skipped,
}

impl PersistOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Written(path) => Some(path),
            Self::Skipped => None,
        }
    }
}

/// An artifact to be written under the output root
#[derive(Debug, Clone)]
pub struct PersistTarget {
    /// Item directory name, relative to the output root
    pub directory: String,

    pub file_name: String,

    pub bytes: Vec<u8>,
}

impl PersistTarget {
    pub fn new(directory: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            bytes,
        }
    }
}
