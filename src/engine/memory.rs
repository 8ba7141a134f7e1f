use std::sync::Arc;

use dashmap::DashMap;

use super::StorageEngine;
use crate::Result;

/// An in-process storage engine. Clones share the same underlying map, so a clone handed to
/// a second server sees everything the first one persisted, just like two page loads sharing
/// one browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    /// creates an empty storage
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl StorageEngine for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).map(|value| value.value().clone()))
    }

    fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}
