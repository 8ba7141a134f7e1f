use tracing::{debug, error, instrument, warn};

use crate::engine::StorageEngine;
use crate::store::EntityStore;
use crate::Result;

/// the storage key the whole catalog document lives under
pub const DB_KEY: &str = "bookish_db";

/// Saves and restores an [`EntityStore`] as a single JSON document under [`DB_KEY`].
///
/// Reads never fail: a missing key and a document that cannot be parsed both come back as
/// `None`, and the caller reseeds. Write failures are returned so the caller can log them,
/// but the in-memory store stays authoritative either way.
#[derive(Debug, Clone)]
pub struct Persistence<E: StorageEngine> {
    engine: E,
}

impl<E: StorageEngine> Persistence<E> {
    /// creates an adapter over the given storage `engine`
    pub fn new(engine: E) -> Self {
        Persistence { engine }
    }

    /// restores the store from storage.
    /// Returns `None` when the key is absent or the document is unreadable.
    #[instrument(skip(self))]
    pub fn load(&self) -> Option<EntityStore> {
        let raw = match self.engine.get_item(DB_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted catalog under {}", DB_KEY);
                return None;
            }
            Err(e) => {
                error!("Failed to read persisted catalog: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<EntityStore>(&raw) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Failed to parse persisted catalog, ignoring it: {}", e);
                None
            }
        }
    }

    /// serializes the whole `store` and writes it under [`DB_KEY`]
    ///
    /// # Errors
    /// returns the serialization or storage error; callers are expected to log it and carry on
    #[instrument(skip(self, store))]
    pub fn commit(&self, store: &EntityStore) -> Result<()> {
        let document = serde_json::to_string(store)?;
        self.engine.set_item(DB_KEY, document)?;
        debug!("catalog persisted");
        Ok(())
    }
}
