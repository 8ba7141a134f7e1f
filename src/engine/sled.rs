use std::path::Path;

use tracing::{debug, instrument};

use super::StorageEngine;
use crate::{BookishError, Result};

/// A wrapper around a [`sled::Db`] that persists items into a directory on disk.
/// Every write is flushed before returning.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// wraps an already opened sled database
    pub fn new(db: sled::Db) -> Self {
        SledStorage { db }
    }

    /// opens (or creates) a sled database in `dir`
    #[instrument]
    pub fn open(dir: &Path) -> Result<Self> {
        let db = sled::open(dir)?;
        debug!("opened sled storage at {:?}", dir);
        Ok(SledStorage::new(db))
    }
}

impl StorageEngine for SledStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key)? {
            Some(ivec) => {
                let value = String::from_utf8(ivec.to_vec()).map_err(|e| {
                    BookishError::Persistence(format!("value of {} is not utf-8: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.db.insert(key, value.into_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}
