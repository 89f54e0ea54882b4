//! Persistence backends consumed by the reader controller
//!
//! Two deliberately separate channels:
//!
//! - [`PositionStore`]: a cookie-like keyed store holding the last spine
//!   position per document, written on every position change with an
//!   expiry.
//! - [`PropertyStore`]: a generic key/value blob store holding the
//!   serialized view-properties projection, written only on explicit
//!   save.
//!
//! The in-memory implementations are the builder defaults and what the
//! test suites use; real embedders supply their own backends.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ReaderError;

/// Expiry applied to persisted reading positions.
pub const POSITION_TTL_DAYS: u32 = 365;

/// Keyed store for the per-document reading position.
pub trait PositionStore {
    /// Fetch the raw stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` with a lifetime of `ttl_days`.
    fn set(&mut self, key: &str, value: &str, ttl_days: u32) -> Result<(), ReaderError>;
}

/// Blob store for serialized view properties.
///
/// The backing connection is acquired per call; implementations must not
/// require the controller to hold one open.
pub trait PropertyStore {
    /// Persist `blob` under `key`, creating the record if needed.
    fn save(&mut self, key: &str, blob: &[u8]) -> Result<(), ReaderError>;
}

// Shared handles, for embedders that keep a reference to the store after
// handing it to the controller (single-threaded model).
impl<S: PositionStore> PositionStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl_days: u32) -> Result<(), ReaderError> {
        self.borrow_mut().set(key, value, ttl_days)
    }
}

impl<S: PropertyStore> PropertyStore for Rc<RefCell<S>> {
    fn save(&mut self, key: &str, blob: &[u8]) -> Result<(), ReaderError> {
        self.borrow_mut().save(key, blob)
    }
}

/// In-process [`PositionStore`], also recording the ttl it was given.
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    entries: HashMap<String, (String, u32)>,
}

impl MemoryPositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, for restoring-from-existing-state scenarios.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store
            .entries
            .insert(key.to_string(), (value.to_string(), POSITION_TTL_DAYS));
        store
    }

    /// The ttl recorded for `key`, if a value is stored.
    pub fn ttl_days(&self, key: &str) -> Option<u32> {
        self.entries.get(key).map(|(_, ttl)| *ttl)
    }
}

impl PositionStore for MemoryPositionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|(value, _)| value.clone())
    }

    fn set(&mut self, key: &str, value: &str, ttl_days: u32) -> Result<(), ReaderError> {
        self.entries
            .insert(key.to_string(), (value.to_string(), ttl_days));
        Ok(())
    }
}

/// In-process [`PropertyStore`].
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    records: HashMap<String, Vec<u8>>,
}

impl MemoryPropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored blob for `key`, if one was saved.
    pub fn record(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(|blob| blob.as_slice())
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn save(&mut self, key: &str, blob: &[u8]) -> Result<(), ReaderError> {
        self.records.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}
