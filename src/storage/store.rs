// Key-value string stores backing workout persistence

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::MaptyError;

/// Trait defining a persistent key-value string store
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>, MaptyError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), MaptyError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), MaptyError>;
}

/// File-based store keeping one `<key>.json` file per key
pub struct FileStore {
    storage_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `storage_path`, creating the directory if needed
    pub fn new(storage_path: PathBuf) -> Result<Self, MaptyError> {
        if !storage_path.exists() {
            fs::create_dir_all(&storage_path)
                .map_err(|e| MaptyError::StorageIOError { source: e })?;
        }

        Ok(Self { storage_path })
    }

    /// Create a store in the default application data directory
    pub fn new_default() -> Result<Self, MaptyError> {
        Self::new(Self::default_storage_path()?)
    }

    pub fn default_storage_path() -> Result<PathBuf, MaptyError> {
        let app_data_dir = dirs::data_dir().ok_or(MaptyError::NoDataDir)?;
        Ok(app_data_dir.join("mapty"))
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn file_path_for_key(&self, key: &str) -> PathBuf {
        let filename = format!("{}.json", Self::normalize_key(key));
        self.storage_path.join(filename)
    }

    /// Keys become file names, anything but alphanumerics is replaced
    fn normalize_key(key: &str) -> String {
        key.to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, MaptyError> {
        let file_path = self.file_path_for_key(key);
        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored value for {} at {:?}", key, file_path);
                Ok(None)
            }
            Err(e) => Err(MaptyError::StorageIOError { source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), MaptyError> {
        let file_path = self.file_path_for_key(key);
        fs::write(&file_path, value).map_err(|e| MaptyError::StorageIOError { source: e })?;
        debug!("Stored {} bytes under {} at {:?}", value.len(), key, file_path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), MaptyError> {
        match fs::remove_file(self.file_path_for_key(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MaptyError::StorageIOError { source: e }),
        }
    }
}

/// In-memory store, lost when dropped
#[derive(Default, Debug)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MaptyError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), MaptyError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), MaptyError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(store.get("workouts").unwrap(), None);

        store.set("workouts", "[]").unwrap();
        assert_eq!(store.get("workouts").unwrap(), Some("[]".to_string()));
        assert!(temp_dir.path().join("workouts.json").exists());

        store.set("workouts", "[1]").unwrap();
        assert_eq!(store.get("workouts").unwrap(), Some("[1]".to_string()));

        store.remove("workouts").unwrap();
        assert_eq!(store.get("workouts").unwrap(), None);
        // removing twice is fine
        store.remove("workouts").unwrap();
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileStore::new(nested.clone()).unwrap();

        assert!(nested.exists());
        assert_eq!(store.storage_path(), nested.as_path());
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(FileStore::normalize_key("My Workouts/2024"), "my_workouts_2024");
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
