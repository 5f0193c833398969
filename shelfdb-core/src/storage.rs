//! Storage backend abstraction for the document store.
//!
//! The [`Storage`] trait is the persistence contract: a backend reads the
//! entire database state as a nested mapping, or writes it back wholesale.
//! There is no partial-table or partial-document persistence primitive.
//! Any type implementing this contract can replace the shipped backends
//! (in-memory and single-file JSON).
//!
//! Backends are driven from a single thread; implementations need no
//! internal synchronization.

use std::collections::BTreeMap;

use crate::{document::Fields, error::ShelfDbResult};

/// One table's slice of the raw persisted state: decimal-string document id
/// to field mapping.
pub type TableData = BTreeMap<String, Fields>;

/// The raw persisted state of a whole database: table name to table data.
///
/// This is the unit that [`Storage::read`] and [`Storage::write`] move
/// atomically as a whole.
pub type StorageData = BTreeMap<String, TableData>;

/// Abstract interface for persistence backends.
pub trait Storage {
    /// Reads the entire persisted state.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet (fresh
    /// in-memory backend, empty or newly created file).
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>>;

    /// Replaces the entire persisted state with `data`.
    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()>;

    /// Releases any resources held by the backend, flushing buffered state.
    ///
    /// The default implementation is a no-op; backends that buffer or hold
    /// file handles should override this.
    fn close(&mut self) -> ShelfDbResult<()> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        (**self).read()
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        (**self).write(data)
    }

    fn close(&mut self) -> ShelfDbResult<()> {
        (**self).close()
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        (**self).read()
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        (**self).write(data)
    }

    fn close(&mut self) -> ShelfDbResult<()> {
        (**self).close()
    }
}
