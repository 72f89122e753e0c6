use crate::errors::RegistryResult;

/// Durable key-value client storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> RegistryResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> RegistryResult<()>;

    fn remove(&self, key: &str) -> RegistryResult<()>;

    /// Write several keys as one unit. The default rolls back keys already
    /// written if a later write fails.
    fn set_all(&self, entries: &[(&str, String)]) -> RegistryResult<()> {
        for (index, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.set(key, value) {
                for (written, _) in &entries[..index] {
                    let _ = self.remove(written);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> RegistryResult<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(err) = self.remove(key) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
