//! File-backed storage: one file per key inside a data directory.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{KeyValueStore, StorageError};

/// Device-local [`KeyValueStore`] writing each key to its own file.
///
/// Writes go to a uniquely named sibling temp file that is renamed over the
/// target, so a reader sees either the old value or the new one, even with
/// several writers on the same directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Stored value");
        Ok(())
    }
}

/// Encode a key into a portable file name.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`, so distinct keys never collide.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("gomarket-{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("@GoMarketPlace"), "%40GoMarketPlace");
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key("plain_key-1"), "plain_key-1");
    }

    #[test]
    fn test_encode_key_distinguishes_escapes() {
        assert_ne!(encode_key("a.b"), encode_key("a%2Eb"));
    }

    #[tokio::test]
    async fn test_get_missing_dir_is_none() {
        let store = temp_store();
        assert_eq!(store.get("@GoMarketPlace").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = temp_store();
        store.set("@GoMarketPlace", "[]").await.unwrap();
        store.set("@GoMarketPlace", "[1]").await.unwrap();

        assert_eq!(
            store.get("@GoMarketPlace").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert!(store.path_for("@GoMarketPlace").exists());
        assert_eq!(leftover_temp_files(&store).await, 0);

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    async fn leftover_temp_files(store: &FileStore) -> usize {
        let mut entries = tokio::fs::read_dir(store.dir()).await.unwrap();
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await.unwrap() {
            if entry.file_name().to_string_lossy().ends_with(".tmp") {
                count += 1;
            }
        }
        count
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_mix_values() {
        let first = temp_store();
        let second = FileStore::new(first.dir());
        let a = "a".repeat(64 * 1024);
        let b = "b".repeat(64 * 1024);

        let mut writes = tokio::task::JoinSet::new();
        for i in 0..20 {
            let (store, value) = if i % 2 == 0 {
                (first.clone(), a.clone())
            } else {
                (second.clone(), b.clone())
            };
            writes.spawn(async move { store.set("k", &value).await });
        }
        while let Some(result) = writes.join_next().await {
            result.unwrap().unwrap();
        }

        let stored = first.get("k").await.unwrap().unwrap();
        assert!(stored == a || stored == b, "stored value mixes two writes");
        assert_eq!(leftover_temp_files(&first).await, 0);

        tokio::fs::remove_dir_all(first.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_error_propagates() {
        let store = temp_store();
        // A directory where the value file should be makes the read fail.
        tokio::fs::create_dir_all(store.path_for("k")).await.unwrap();

        assert!(matches!(store.get("k").await, Err(StorageError::Io(_))));

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }
}
