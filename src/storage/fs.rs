use crate::storage::{PersistOutcome, PersistTarget, StorageError, StorageResult};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Length of the random suffix added on a name collision
const SUFFIX_LEN: usize = 6;

/// Attempts at finding a free name before giving up
const MAX_ATTEMPTS: usize = 16;

/// Filesystem-backed artifact writer rooted at the output directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output root if it does not exist yet
    pub async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })
    }

    /// Path of an item directory under the root
    pub fn item_dir(&self, directory: &str) -> PathBuf {
        self.root.join(directory)
    }

    /// Writes a target under `root/<directory>/<file_name>`
    pub async fn persist_target(&self, target: &PersistTarget) -> StorageResult<PersistOutcome> {
        let path = self.item_dir(&target.directory).join(&target.file_name);
        self.persist(&path, &target.bytes).await
    }

    /// Writes `bytes` at `path` without ever overwriting an existing file
    ///
    /// The parent directory is created on demand. If `path` is taken, a random
    /// alphanumeric suffix is appended to the file name and the write is
    /// retried under the new name. Empty content is not written at all and is
    /// reported as [`PersistOutcome::Skipped`].
    ///
    /// # Returns
    ///
    /// * `Ok(PersistOutcome::Written(path))` - Where the bytes actually landed
    /// * `Ok(PersistOutcome::Skipped)` - `bytes` was empty
    /// * `Err(StorageError)` - The filesystem refused the write
    pub async fn persist(&self, path: &Path, bytes: &[u8]) -> StorageResult<PersistOutcome> {
        if bytes.is_empty() {
            tracing::warn!(path = %path.display(), "No data to write, skipping");
            return Ok(PersistOutcome::Skipped);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut candidate = path.to_path_buf();
        for _ in 0..MAX_ATTEMPTS {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut file) => {
                    write_all(&mut file, &candidate, bytes).await?;
                    tracing::debug!(path = %candidate.display(), bytes = bytes.len(), "Saved artifact");
                    return Ok(PersistOutcome::Written(candidate));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %candidate.display(), "Name taken, adding suffix");
                    candidate = with_random_suffix(path);
                }
                Err(source) => {
                    return Err(StorageError::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        }

        Err(StorageError::CollisionsExhausted {
            path: path.to_path_buf(),
        })
    }
}

/// Writes and flushes `bytes`; a partially written file is removed on failure
async fn write_all(file: &mut fs::File, path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let result = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(source) = result {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial file");
        }
        return Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Appends `_XXXXXX` to the file name of `path`
fn with_random_suffix(path: &Path) -> PathBuf {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push("_");
    name.push(suffix);
    path.with_file_name(name)
}
