//! A narrowing adapter exposing one table's slice of the persisted state.
//!
//! A [`StorageProxy`] sits between a [`Table`](crate::table::Table) and the
//! shared storage handle. It translates between the raw nested state (table
//! name to decimal-string ids) and the integer-keyed document mapping the
//! table operates on.
//!
//! `read` retains the full raw state it saw so that the `write` closing the
//! same read-modify-write cycle can merge the table back without re-reading
//! the backend; the retained state is consumed by that `write` and never
//! outlives the cycle.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::document::{DocId, Document};
use crate::error::{ShelfDbError, ShelfDbResult};
use crate::storage::{Storage, StorageData, TableData};

/// Narrows a shared [`Storage`] to a single named table.
pub struct StorageProxy<S: Storage> {
    storage: Rc<RefCell<S>>,
    table_name: String,
    /// Full raw state retained between a `read` and the `write` that
    /// completes the same cycle.
    raw: RefCell<Option<StorageData>>,
}

impl<S: Storage> StorageProxy<S> {
    pub(crate) fn new(storage: Rc<RefCell<S>>, table_name: impl Into<String>) -> Self {
        Self {
            storage,
            table_name: table_name.into(),
            raw: RefCell::new(None),
        }
    }

    /// The table this proxy is narrowed to.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Reads this table's documents, keyed by integer id.
    ///
    /// If the table has no entry in the raw state yet, an empty entry is
    /// created and persisted before returning.
    pub fn read(&self) -> ShelfDbResult<BTreeMap<DocId, Document>> {
        let mut raw = self.storage.borrow_mut().read()?.unwrap_or_default();
        if !raw.contains_key(&self.table_name) {
            raw.insert(self.table_name.clone(), TableData::new());
            self.storage.borrow_mut().write(&raw)?;
        }

        let mut documents = BTreeMap::new();
        for (key, doc_fields) in &raw[&self.table_name] {
            let doc_id: DocId = key.parse().map_err(|_| {
                ShelfDbError::InvalidDocId(key.clone(), self.table_name.clone())
            })?;
            documents.insert(doc_id, Document::new(doc_id, doc_fields.clone()));
        }

        *self.raw.borrow_mut() = Some(raw);
        Ok(documents)
    }

    /// Merges `documents` back under this table and writes the whole state.
    ///
    /// Uses the raw state retained by the preceding `read`, or a fresh read
    /// when none is retained.
    pub fn write(&self, documents: &BTreeMap<DocId, Document>) -> ShelfDbResult<()> {
        let mut raw = match self.raw.borrow_mut().take() {
            Some(raw) => raw,
            None => self.storage.borrow_mut().read()?.unwrap_or_default(),
        };

        let table: TableData = documents
            .iter()
            .map(|(doc_id, doc)| (doc_id.to_string(), doc.fields().clone()))
            .collect();
        raw.insert(self.table_name.clone(), table);

        self.storage.borrow_mut().write(&raw)
    }

    /// Removes this table's entry from the raw state; no-op if absent.
    pub fn purge_table(&self) -> ShelfDbResult<()> {
        *self.raw.borrow_mut() = None;
        let mut raw = self.storage.borrow_mut().read()?.unwrap_or_default();
        if raw.remove(&self.table_name).is_some() {
            self.storage.borrow_mut().write(&raw)?;
        }
        Ok(())
    }
}
