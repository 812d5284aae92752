// src/recording/store.rs
//! File-backed mock store
//!
//! One plain-text file per fingerprint at
//! `<work_dir>/<host-and-path folder>/<method>-<hash8>`. Existing records are
//! never overwritten unless forced, and never deleted by the engine.

use crate::recording::fingerprint::Fingerprint;
use crate::utils::errors::{EngineError, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::{fs, task};
use tracing::{debug, info};

/// Prefix of in-progress record files; `list` skips dot files
const TEMP_PREFIX: &str = ".record-";

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `<root_dir>/<namespace>`
    pub work_dir: PathBuf,

    /// Whether records may be created (false in strict mode)
    pub record_new: bool,
}

impl StoreConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            record_new: true,
        }
    }

    pub fn with_record_new(mut self, record_new: bool) -> Self {
        self.record_new = record_new;
        self
    }
}

/// Result of a store write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// New record created
    Written,

    /// Record already existed and was left untouched
    AlreadyRecorded,

    /// Existing record replaced because `force` was set
    Overwritten,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub records: u64,
    pub total_size_bytes: u64,
}

/// Mock store rooted at one namespace directory
#[derive(Debug, Clone)]
pub struct MockStore {
    config: StoreConfig,
}

impl MockStore {
    /// Open the store, creating the namespace directory if needed
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.create_work_dir().await?;
        Ok(store)
    }

    pub async fn create_work_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.config.work_dir).await.map_err(|e| {
            EngineError::StoreWriteFailure(format!(
                "Failed to create mock directory {}: {}",
                self.config.work_dir.display(),
                e
            ))
        })?;

        debug!("Mock store opened at {:?}", self.config.work_dir);
        Ok(())
    }

    /// Store handle without touching the filesystem
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.config.work_dir.join(fingerprint.relative_path())
    }

    /// Read the raw stored text for a fingerprint
    pub async fn read(&self, fingerprint: &Fingerprint) -> Result<String> {
        let path = self.path_for(fingerprint);

        match fs::read_to_string(&path).await {
            Ok(text) => {
                debug!("Read mock {:?} ({} bytes)", path, text.len());
                Ok(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(EngineError::MockNotFound {
                method: fingerprint.method().to_string(),
                url: fingerprint.url().to_string(),
            }),
            Err(e) => Err(EngineError::StoreReadFailure(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Persist a record
    ///
    /// The contents are written to a temporary file next to the record and
    /// published with a single link/rename, so a concurrent `read` sees either
    /// no record or the complete one. Without `force` an existing record wins
    /// and the call still succeeds.
    pub async fn write(
        &self,
        fingerprint: &Fingerprint,
        contents: &str,
        force: bool,
    ) -> Result<WriteOutcome> {
        let path = self.path_for(fingerprint);

        let folder = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.work_dir.clone());
        let record_new = self.config.record_new;
        let target = path.clone();
        let bytes = contents.as_bytes().to_vec();

        let published = task::spawn_blocking(move || {
            publish(&folder, &target, &bytes, force, record_new)
        })
        .await
        .map_err(|e| EngineError::StoreWriteFailure(format!("Write task failed: {}", e)))?
        .map_err(|e| write_failure(&path, e))?;

        let status = match published {
            Published::Done(status) => status,
            Published::Refused => {
                return Err(EngineError::StoreWriteFailure(format!(
                    "Refusing to record new mock {} in strict mode",
                    path.display()
                )));
            }
        };

        match status {
            WriteStatus::AlreadyRecorded => debug!("Mock {:?} already recorded", path),
            _ => info!("Recorded mock {:?} ({} bytes)", path, contents.len()),
        }

        Ok(WriteOutcome { path, status })
    }

    /// All record files under the namespace, sorted
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        let mut records = Vec::new();

        let mut folders = match fs::read_dir(&self.config.work_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        while let Some(folder) = folders.next_entry().await? {
            if !folder.file_type().await?.is_dir() {
                continue;
            }

            let mut files = fs::read_dir(folder.path()).await?;
            while let Some(file) = files.next_entry().await? {
                // unpublished temporaries
                if file.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                if file.file_type().await?.is_file() {
                    records.push(file.path());
                }
            }
        }

        records.sort();
        Ok(records)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();

        for path in self.list().await? {
            let metadata = fs::metadata(&path).await?;
            stats.records += 1;
            stats.total_size_bytes += metadata.len();
        }

        Ok(stats)
    }
}

enum Published {
    Done(WriteStatus),
    Refused,
}

/// Blocking half of [`MockStore::write`]
///
/// A store that may not record new mocks never creates a file: without
/// `force` the existing record is the outcome, and a missing one is refused
/// without writing anything.
fn publish(
    folder: &Path,
    path: &Path,
    contents: &[u8],
    force: bool,
    record_new: bool,
) -> std::io::Result<Published> {
    if !record_new && !force {
        return match std::fs::metadata(path) {
            Ok(_) => Ok(Published::Done(WriteStatus::AlreadyRecorded)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Published::Refused),
            Err(e) => Err(e),
        };
    }

    let existed = path.exists();
    if force && !existed && !record_new {
        return Ok(Published::Refused);
    }

    std::fs::create_dir_all(folder)?;
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(folder)?;
    temp.write_all(contents)?;
    temp.as_file().sync_data()?;

    if force {
        temp.persist(path).map_err(|e| e.error)?;
        return Ok(Published::Done(if existed {
            WriteStatus::Overwritten
        } else {
            WriteStatus::Written
        }));
    }

    match temp.persist_noclobber(path) {
        Ok(_) => Ok(Published::Done(WriteStatus::Written)),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            Ok(Published::Done(WriteStatus::AlreadyRecorded))
        }
        Err(e) => Err(e.error),
    }
}

fn write_failure(path: &Path, e: std::io::Error) -> EngineError {
    EngineError::StoreWriteFailure(format!("Failed to write {}: {}", path.display(), e))
}
