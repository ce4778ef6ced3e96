use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::{PersistenceBackend, Storage, StorageError};

/// Stores each key as a JSON file inside one directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous record intact.
#[derive(Clone, Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Uses `dir` for all records, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_key(key)))
    }
}

/// Makes a key safe to use as a file name.
///
/// ASCII alphanumerics plus `-`, `_`, `.` and `@` pass through; every other
/// byte becomes `%XX`. A leading `.` is escaped too.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'@')
            || (byte == b'.' && i > 0);
        if keep {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[async_trait]
impl PersistenceBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` that keeps one JSON file per namespace in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn file(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let backend = FileBackend::open(dir).await?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_key_keeps_safe_characters() {
        assert_eq!(escape_key("lms_state_ana@x.org"), "lms_state_ana@x.org");
        assert_eq!(escape_key("lms_state_a/b"), "lms_state_a%2Fb");
        assert_eq!(escape_key("..x"), "%2E.x");
    }

    #[test]
    fn keys_differing_in_case_map_to_different_files() {
        assert_ne!(escape_key("lms_state_Ana"), escape_key("lms_state_ana"));
    }

    #[tokio::test]
    async fn set_then_get_reads_back_value() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("state")).await.unwrap();
        assert!(backend.get("lms_state_guest").await.unwrap().is_none());
        backend.set("lms_state_guest", "{}").await.unwrap();
        backend.set("lms_state_guest", "{\"a\":1}").await.unwrap();
        assert_eq!(
            backend.get("lms_state_guest").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }
}
