//! This module provides the durable key/value storage engines the catalog persists into.
//!
//! The catalog only ever needs string keys mapped to string values, much like a browser's
//! `localStorage`. Two engines are implemented: [`SledStorage`], backed by the [`sled`]
//! embedded database, and [`MemoryStorage`], an in-process map that is useful for tests and
//! for running without touching the disk.
//!
//! [`sled`]: https://docs.rs/sled/latest/sled/
use crate::Result;

/// A trait for the basic functionality of a key/value storage engine
pub trait StorageEngine: Clone + Send + 'static {
    /// Gets the value associated with the given `key`
    ///
    /// Returns `None` if the given `key` does not exist.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// sets a `key` and `value`
    ///
    /// If the given `key` already exists the previous `value` will be overwritten.
    fn set_item(&self, key: &str, value: String) -> Result<()>;

    /// Removes the given `key` (and associated value) from the storage.
    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

mod memory;
mod sled;

pub use self::memory::MemoryStorage;
pub use self::sled::SledStorage;
