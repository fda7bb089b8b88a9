// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Provides persistent state across daemon restarts, and a liveness
// timestamp that external health checks can read without talking to the
// daemon.
//
// ## File Layout
//
// ```text
// <state_dir>/last_ipv4     203.0.113.5
// <state_dir>/last_ipv6     2001:db8::1
// <state_dir>/last_update   1767225600
// ```
//
// Each file holds exactly one value followed by a newline. Writes go to a
// `.tmp` sibling first and are renamed into place.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::address::IpVersion;
use crate::traits::state_store::StateStore;

/// File holding the epoch-seconds timestamp of the last completed cycle
pub const TIMESTAMP_FILE_NAME: &str = "last_update";

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use dyndns_core::state::FileStateStore;
/// use dyndns_core::{IpVersion, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/dyndns").await?;
///
///     store.write(IpVersion::V4, "203.0.113.5").await?;
///     assert_eq!(store.read(IpVersion::V4).await?, "203.0.113.5");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Open a state directory, creating it if needed
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { dir })
    }

    /// Open a state directory without touching the filesystem
    ///
    /// Used by read-only consumers such as the health check.
    pub fn open_existing<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the state files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn address_path(&self, version: IpVersion) -> PathBuf {
        self.dir.join(version.cache_file_name())
    }

    fn timestamp_path(&self) -> PathBuf {
        self.dir.join(TIMESTAMP_FILE_NAME)
    }

    /// Read a file, treating "does not exist" as empty
    async fn read_value(path: &Path) -> Result<String, Error> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State file does not exist: {}", path.display());
                Ok(String::new())
            }
            Err(e) => Err(Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Replace a file's content atomically
    async fn write_value(path: &Path, value: &str) -> Result<(), Error> {
        let mut temp_path = path.to_path_buf();
        temp_path.set_extension("tmp");

        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(format!("{}\n", value.trim()).as_bytes())
                .await
                .map_err(|e| {
                    Error::state_store(format!(
                        "Failed to write to temp file {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read(&self, version: IpVersion) -> Result<String, Error> {
        Self::read_value(&self.address_path(version)).await
    }

    async fn write(&self, version: IpVersion, value: &str) -> Result<(), Error> {
        Self::write_value(&self.address_path(version), value).await
    }

    async fn record_cycle_timestamp(&self, epoch_secs: i64) -> Result<(), Error> {
        Self::write_value(&self.timestamp_path(), &epoch_secs.to_string()).await
    }

    async fn last_cycle_timestamp(&self) -> Result<Option<i64>, Error> {
        let path = self.timestamp_path();
        let raw = Self::read_value(&path).await?;
        if raw.is_empty() {
            return Ok(None);
        }

        raw.parse::<i64>().map(Some).map_err(|e| {
            Error::state_store(format!(
                "Invalid timestamp in {}: {:?} ({})",
                path.display(),
                raw,
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path()).await.unwrap();

        assert_eq!(store.read(IpVersion::V4).await.unwrap(), "");
        assert_eq!(store.read(IpVersion::V6).await.unwrap(), "");
        assert_eq!(store.last_cycle_timestamp().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_overwrites_and_persists() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path()).await.unwrap();

        store.write(IpVersion::V4, "198.51.100.7").await.unwrap();
        store.write(IpVersion::V4, "203.0.113.5").await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("last_ipv4")).unwrap();
        assert_eq!(on_disk, "203.0.113.5\n");
        assert!(!dir.path().join("last_ipv4.tmp").exists());

        // A fresh instance sees the same value
        let store2 = FileStateStore::new(dir.path()).await.unwrap();
        assert_eq!(store2.read(IpVersion::V4).await.unwrap(), "203.0.113.5");
        assert_eq!(store2.read(IpVersion::V6).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_read_trims_external_edits() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("last_ipv6"), "  2001:db8::1 \n\n").unwrap();

        let store = FileStateStore::new(dir.path()).await.unwrap();
        assert_eq!(store.read(IpVersion::V6).await.unwrap(), "2001:db8::1");
    }

    #[tokio::test]
    async fn test_timestamp_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path()).await.unwrap();

        store.record_cycle_timestamp(1_767_225_600).await.unwrap();
        assert_eq!(
            store.last_cycle_timestamp().await.unwrap(),
            Some(1_767_225_600)
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(TIMESTAMP_FILE_NAME)).unwrap(),
            "1767225600\n"
        );
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(TIMESTAMP_FILE_NAME), "yesterday").unwrap();

        let store = FileStateStore::new(dir.path()).await.unwrap();
        assert!(store.last_cycle_timestamp().await.is_err());
    }

    #[tokio::test]
    async fn test_creates_nested_state_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("var").join("lib").join("dyndns");

        let store = FileStateStore::new(&nested).await.unwrap();
        store.write(IpVersion::V4, "1.2.3.4").await.unwrap();

        assert!(nested.join("last_ipv4").exists());
        assert_eq!(store.dir(), nested.as_path());
    }
}
