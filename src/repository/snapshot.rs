use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::repository::{RepositoryError, RepositoryResult, SnapshotStore};

/// Stores each snapshot as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> RepositoryResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(RepositoryError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save_snapshot(&self, key: &str, value: &Value) -> RepositoryResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Readers only ever observe a complete file.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec(value)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn load_snapshot(&self, key: &str) -> RepositoryResult<Option<Value>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Process-local snapshot storage.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| RepositoryError::Unavailable("snapshot store lock poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save_snapshot(&self, key: &str, value: &Value) -> RepositoryResult<()> {
        self.lock()?.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn load_snapshot(&self, key: &str) -> RepositoryResult<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }
}
