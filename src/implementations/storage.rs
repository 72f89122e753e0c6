use std::collections::BTreeMap;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::{ Mutex, PoisonError };

use log::{ debug, warn };

use crate::errors::{ RegistryError, RegistryResult };
use crate::traits::storage::KeyValueStore;

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as one JSON object on disk.
///
/// Every write replaces the file through a temporary sibling and a rename, so
/// readers never observe a half-written file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> RegistryResult<Entries> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Entries::new());
            }
            Err(err) => {
                return Err(
                    RegistryError::Storage(format!("Failed to read {}: {}", self.path.display(), err))
                );
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                // A corrupt file is treated as empty; the next write replaces it.
                warn!("Ignoring unreadable store at {}: {}", self.path.display(), err);
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs
                    ::create_dir_all(parent)
                    .map_err(|e| RegistryError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
            }
        }
        let contents = serde_json
            ::to_string_pretty(entries)
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs
            ::write(&tmp, contents)
            .map_err(|e| RegistryError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs
            ::rename(&tmp, &self.path)
            .map_err(|e| RegistryError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;
        debug!("Wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn update<F>(&self, apply: F) -> RegistryResult<()> where F: FnOnce(&mut Entries) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> RegistryResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> RegistryResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> RegistryResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn set_all(&self, pairs: &[(&str, String)]) -> RegistryResult<()> {
        self.update(|entries| {
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.clone());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> RegistryResult<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

/// In-process store, used by tests and one-shot commands
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RegistryResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RegistryResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RegistryResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store.set_all(&[("token", "abc".to_string()), ("user", "{}".to_string())]).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("user").unwrap().as_deref(), Some("{}"));
        assert!(!path.with_extension("tmp").exists());

        reopened.remove_all(&["token", "user"]).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
    }
}
