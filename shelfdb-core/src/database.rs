//! The top-level database handle and its builder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::document::{DocId, Document, Fields};
use crate::error::ShelfDbResult;
use crate::query::Query;
use crate::storage::{Storage, StorageData};
use crate::table::{Table, DEFAULT_QUERY_CACHE_CAPACITY};

/// Name of the table all document operations on the database itself target.
pub const DEFAULT_TABLE: &str = "_default";

/// An embedded document database over a [`Storage`] backend.
///
/// A `ShelfDb` is a collection of named [`Table`]s sharing one storage.
/// Document operations called directly on the database are forwarded to
/// the [`DEFAULT_TABLE`]. Handles are single-threaded; clone the `Rc`
/// returned by [`ShelfDb::table`] to share a table within a thread.
pub struct ShelfDb<S: Storage> {
    storage: Rc<RefCell<S>>,
    tables: RefCell<HashMap<String, Rc<Table<S>>>>,
    default_table: String,
    query_cache_capacity: Option<usize>,
}

impl<S: Storage> ShelfDb<S> {
    /// Opens a database over `storage` with default settings.
    ///
    /// Use [`ShelfDbBuilder`] for non-default settings.
    pub fn new(storage: S) -> Self {
        ShelfDbBuilder::new().build(storage)
    }

    /// Returns the table with the given name, creating its handle on
    /// first use.
    ///
    /// Repeated calls with the same name return the same handle, so
    /// query-cache state is shared between them.
    pub fn table(&self, name: &str) -> Rc<Table<S>> {
        let mut tables = self.tables.borrow_mut();
        if let Some(table) = tables.get(name) {
            return Rc::clone(table);
        }
        let table = Rc::new(Table::new(
            Rc::clone(&self.storage),
            name,
            self.query_cache_capacity,
        ));
        tables.insert(name.to_string(), Rc::clone(&table));
        table
    }

    /// Names of every table present in storage.
    pub fn tables(&self) -> ShelfDbResult<Vec<String>> {
        let data = self.storage.borrow_mut().read()?.unwrap_or_default();
        Ok(data.into_keys().collect())
    }

    /// Drops every table, leaving storage empty.
    pub fn purge_tables(&self) -> ShelfDbResult<()> {
        self.storage.borrow_mut().write(&StorageData::new())?;
        for table in self.tables.borrow().values() {
            table.clear_cache();
        }
        self.tables.borrow_mut().clear();
        Ok(())
    }

    /// Drops a single table by name. Unknown names are a no-op.
    pub fn purge_table(&self, name: &str) -> ShelfDbResult<()> {
        if let Some(table) = self.tables.borrow_mut().remove(name) {
            table.clear_cache();
        }
        // Read storage directly so a missing table is not created as a
        // side effect of dropping it.
        let mut data = self.storage.borrow_mut().read()?.unwrap_or_default();
        if data.remove(name).is_some() {
            self.storage.borrow_mut().write(&data)?;
        }
        Ok(())
    }

    /// Flushes and closes the underlying storage, consuming the handle.
    pub fn close(self) -> ShelfDbResult<()> {
        self.tables.borrow_mut().clear();
        self.storage.borrow_mut().close()
    }

    // Document operations below are forwarded to the default table.

    fn default_table(&self) -> Rc<Table<S>> {
        self.table(&self.default_table)
    }

    /// Inserts into the default table. See [`Table::insert`].
    pub fn insert(&self, fields: Fields) -> ShelfDbResult<DocId> {
        self.default_table().insert(fields)
    }

    /// Inserts several documents into the default table.
    /// See [`Table::insert_multiple`].
    pub fn insert_multiple<I>(&self, documents: I) -> ShelfDbResult<Vec<DocId>>
    where
        I: IntoIterator<Item = Fields>,
    {
        self.default_table().insert_multiple(documents)
    }

    /// Every document in the default table. See [`Table::all`].
    pub fn all(&self) -> ShelfDbResult<Vec<Document>> {
        self.default_table().all()
    }

    /// Searches the default table. See [`Table::search`].
    pub fn search(&self, query: &Query) -> ShelfDbResult<Vec<Document>> {
        self.default_table().search(query)
    }

    /// First match in the default table. See [`Table::get`].
    pub fn get(&self, query: &Query) -> ShelfDbResult<Option<Document>> {
        self.default_table().get(query)
    }

    /// Lookup by id in the default table. See [`Table::get_by_id`].
    pub fn get_by_id(&self, doc_id: DocId) -> ShelfDbResult<Option<Document>> {
        self.default_table().get_by_id(doc_id)
    }

    /// Updates documents in the default table. See [`Table::update`].
    pub fn update(
        &self,
        fields: Fields,
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        self.default_table().update(fields, query, doc_ids)
    }

    /// Updates documents in the default table with a closure.
    /// See [`Table::update_with`].
    pub fn update_with(
        &self,
        apply: impl FnMut(&mut Fields),
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        self.default_table().update_with(apply, query, doc_ids)
    }

    /// Removes documents from the default table. See [`Table::remove`].
    pub fn remove(
        &self,
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        self.default_table().remove(query, doc_ids)
    }

    /// Match count in the default table. See [`Table::count`].
    pub fn count(&self, query: &Query) -> ShelfDbResult<usize> {
        self.default_table().count(query)
    }

    /// Whether the default table has a match. See [`Table::contains`].
    pub fn contains(&self, query: &Query) -> ShelfDbResult<bool> {
        self.default_table().contains(query)
    }

    /// Whether the default table holds the given id.
    /// See [`Table::contains_id`].
    pub fn contains_id(&self, doc_id: DocId) -> ShelfDbResult<bool> {
        self.default_table().contains_id(doc_id)
    }

    /// Number of documents in the default table. See [`Table::len`].
    pub fn len(&self) -> ShelfDbResult<usize> {
        self.default_table().len()
    }

    /// Whether the default table is empty. See [`Table::is_empty`].
    pub fn is_empty(&self) -> ShelfDbResult<bool> {
        self.default_table().is_empty()
    }
}

/// Builder for [`ShelfDb`] handles.
#[derive(Debug, Clone)]
pub struct ShelfDbBuilder {
    default_table: String,
    query_cache_capacity: Option<usize>,
}

impl ShelfDbBuilder {
    pub fn new() -> Self {
        Self {
            default_table: DEFAULT_TABLE.to_string(),
            query_cache_capacity: Some(DEFAULT_QUERY_CACHE_CAPACITY),
        }
    }

    /// Table that document operations on the database itself target.
    pub fn default_table(mut self, name: impl Into<String>) -> Self {
        self.default_table = name.into();
        self
    }

    /// Per-table query-result cache capacity. `None` leaves the cache
    /// unbounded.
    pub fn query_cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    pub fn build<S: Storage>(self, storage: S) -> ShelfDb<S> {
        ShelfDb {
            storage: Rc::new(RefCell::new(storage)),
            tables: RefCell::new(HashMap::new()),
            default_table: self.default_table,
            query_cache_capacity: self.query_cache_capacity,
        }
    }
}

impl Default for ShelfDbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field;
    use crate::testutil::{fields, MemStorage};
    use serde_json::json;

    fn db() -> ShelfDb<MemStorage> {
        ShelfDb::new(MemStorage::default())
    }

    #[test]
    fn document_operations_target_the_default_table() {
        let db = db();
        db.insert(fields(json!({"name": "ada"}))).unwrap();
        assert_eq!(db.table(DEFAULT_TABLE).len().unwrap(), 1);
        assert_eq!(db.tables().unwrap(), vec![DEFAULT_TABLE.to_string()]);
        assert!(db.contains(&field("name").eq("ada")).unwrap());
    }

    #[test]
    fn table_handles_are_shared_by_name() {
        let db = db();
        let a = db.table("people");
        let b = db.table("people");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &db.table("pets")));
    }

    #[test]
    fn tables_are_isolated() {
        let db = db();
        db.table("people")
            .insert(fields(json!({"name": "ada"})))
            .unwrap();
        db.table("pets")
            .insert(fields(json!({"name": "rex"})))
            .unwrap();

        assert_eq!(db.table("people").len().unwrap(), 1);
        assert_eq!(db.table("pets").len().unwrap(), 1);

        let mut names = db.tables().unwrap();
        names.sort();
        assert_eq!(names, vec!["people".to_string(), "pets".to_string()]);

        // Reading through the database touches the default table, which
        // creates and persists its entry.
        assert!(db.is_empty().unwrap());
        let mut names = db.tables().unwrap();
        names.sort();
        assert_eq!(
            names,
            vec![
                DEFAULT_TABLE.to_string(),
                "people".to_string(),
                "pets".to_string()
            ]
        );
    }

    #[test]
    fn purge_table_drops_one_table_only() {
        let db = db();
        db.table("people")
            .insert(fields(json!({"n": 1})))
            .unwrap();
        db.table("pets").insert(fields(json!({"n": 2}))).unwrap();

        db.purge_table("people").unwrap();
        assert_eq!(db.tables().unwrap(), vec!["pets".to_string()]);

        // A fresh handle sees the table as empty again.
        assert!(db.table("people").is_empty().unwrap());
    }

    #[test]
    fn purge_table_on_unknown_name_is_a_no_op() {
        let db = db();
        db.insert(fields(json!({"n": 1}))).unwrap();
        db.purge_table("nope").unwrap();
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn purge_tables_empties_storage() {
        let db = db();
        db.table("people")
            .insert(fields(json!({"n": 1})))
            .unwrap();
        db.insert(fields(json!({"n": 2}))).unwrap();

        db.purge_tables().unwrap();
        assert!(db.tables().unwrap().is_empty());
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn builder_sets_the_default_table() {
        let db = ShelfDbBuilder::new()
            .default_table("main")
            .build(MemStorage::default());
        db.insert(fields(json!({"n": 1}))).unwrap();
        assert_eq!(db.tables().unwrap(), vec!["main".to_string()]);
        assert_eq!(db.table("main").len().unwrap(), 1);
    }

    #[test]
    fn close_flushes_storage() {
        let db = db();
        db.insert(fields(json!({"n": 1}))).unwrap();
        db.close().unwrap();
    }
}
