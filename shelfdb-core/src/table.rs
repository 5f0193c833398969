//! Tables: named collections of documents with their own id allocators.
//!
//! Every operation is one synchronous read-modify-write cycle against the
//! table's [`StorageProxy`]. Search results are held in an LRU cache keyed
//! by query identity and invalidated by every mutation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::cache::LruCache;
use crate::document::{DocId, Document, Fields};
use crate::error::{ShelfDbError, ShelfDbResult};
use crate::proxy::StorageProxy;
use crate::query::Query;
use crate::storage::Storage;

/// Query-result cache capacity unless configured otherwise.
pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 10;

/// A named collection of documents.
///
/// Obtained from [`ShelfDb::table`](crate::database::ShelfDb::table);
/// cheaply shared within a thread via `Rc`.
pub struct Table<S: Storage> {
    name: String,
    proxy: StorageProxy<S>,
    query_cache: RefCell<LruCache<Query, Vec<Document>>>,
}

impl<S: Storage> Table<S> {
    pub(crate) fn new(
        storage: Rc<RefCell<S>>,
        name: impl Into<String>,
        query_cache_capacity: Option<usize>,
    ) -> Self {
        let name = name.into();
        let query_cache = match query_cache_capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            proxy: StorageProxy::new(storage, name.clone()),
            name,
            query_cache: RefCell::new(query_cache),
        }
    }

    /// The table's name, unique within its database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a new document, returning its assigned id.
    ///
    /// The id is `max(existing ids) + 1`, or 1 for an empty table. Deleting
    /// the highest-numbered document therefore allows its id to be
    /// reissued; this reuse policy is deliberate.
    pub fn insert(&self, fields: Fields) -> ShelfDbResult<DocId> {
        let mut data = self.proxy.read()?;
        let doc_id = next_id(&data);
        data.insert(doc_id, Document::new(doc_id, fields));
        self.proxy.write(&data)?;
        self.clear_cache();
        Ok(doc_id)
    }

    /// Inserts several documents in one read-modify-write cycle, returning
    /// their assigned ids in order.
    pub fn insert_multiple<I>(&self, documents: I) -> ShelfDbResult<Vec<DocId>>
    where
        I: IntoIterator<Item = Fields>,
    {
        let mut data = self.proxy.read()?;
        let mut doc_ids = Vec::new();
        for fields in documents {
            let doc_id = next_id(&data);
            data.insert(doc_id, Document::new(doc_id, fields));
            doc_ids.push(doc_id);
        }
        self.proxy.write(&data)?;
        self.clear_cache();
        Ok(doc_ids)
    }

    /// Returns every document in the table.
    pub fn all(&self) -> ShelfDbResult<Vec<Document>> {
        Ok(self.proxy.read()?.into_values().collect())
    }

    /// Returns all documents matching `query`.
    ///
    /// Results for cacheable queries are served from and stored in the
    /// table's LRU result cache.
    pub fn search(&self, query: &Query) -> ShelfDbResult<Vec<Document>> {
        if query.is_cacheable() {
            if let Some(hit) = self.query_cache.borrow_mut().get(query) {
                return Ok(hit.clone());
            }
        }

        let results: Vec<Document> = self
            .proxy
            .read()?
            .into_values()
            .filter(|doc| query.matches(doc))
            .collect();

        if query.is_cacheable() {
            self.query_cache
                .borrow_mut()
                .insert(query.clone(), results.clone());
        }
        Ok(results)
    }

    /// Returns the first document matching `query`, if any.
    pub fn get(&self, query: &Query) -> ShelfDbResult<Option<Document>> {
        Ok(self
            .proxy
            .read()?
            .into_values()
            .find(|doc| query.matches(doc)))
    }

    /// Returns the document with the given id, if present.
    pub fn get_by_id(&self, doc_id: DocId) -> ShelfDbResult<Option<Document>> {
        Ok(self.proxy.read()?.remove(&doc_id))
    }

    /// Merges `fields` into every selected document, returning the ids of
    /// the documents touched.
    ///
    /// Exactly one of `query` and `doc_ids` must be supplied. Ids absent
    /// from the table are skipped, not errors.
    pub fn update(
        &self,
        fields: Fields,
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        self.update_with(
            |doc_fields| {
                for (key, value) in &fields {
                    doc_fields.insert(key.clone(), value.clone());
                }
            },
            query,
            doc_ids,
        )
    }

    /// Applies `apply` to every selected document's fields, returning the
    /// ids of the documents touched.
    ///
    /// Selector rules are the same as for [`Table::update`].
    pub fn update_with(
        &self,
        mut apply: impl FnMut(&mut Fields),
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        let mut data = self.proxy.read()?;
        let targets = select_targets(&data, query, doc_ids)?;
        for doc_id in &targets {
            if let Some(doc) = data.get_mut(doc_id) {
                apply(doc.fields_mut());
            }
        }
        self.proxy.write(&data)?;
        self.clear_cache();
        Ok(targets)
    }

    /// Removes every selected document, returning the ids removed.
    ///
    /// Selector rules are the same as for [`Table::update`].
    pub fn remove(
        &self,
        query: Option<&Query>,
        doc_ids: Option<&[DocId]>,
    ) -> ShelfDbResult<Vec<DocId>> {
        let mut data = self.proxy.read()?;
        let targets = select_targets(&data, query, doc_ids)?;
        for doc_id in &targets {
            data.remove(doc_id);
        }
        self.proxy.write(&data)?;
        self.clear_cache();
        Ok(targets)
    }

    /// Counts the documents matching `query`.
    pub fn count(&self, query: &Query) -> ShelfDbResult<usize> {
        Ok(self.search(query)?.len())
    }

    /// Whether any document matches `query`.
    pub fn contains(&self, query: &Query) -> ShelfDbResult<bool> {
        Ok(self.get(query)?.is_some())
    }

    /// Whether a document with the given id exists.
    pub fn contains_id(&self, doc_id: DocId) -> ShelfDbResult<bool> {
        Ok(self.proxy.read()?.contains_key(&doc_id))
    }

    /// Removes every document in the table.
    pub fn purge(&self) -> ShelfDbResult<()> {
        self.proxy.read()?;
        self.proxy.write(&BTreeMap::new())?;
        self.clear_cache();
        Ok(())
    }

    /// Number of documents in the table.
    pub fn len(&self) -> ShelfDbResult<usize> {
        Ok(self.proxy.read()?.len())
    }

    /// Whether the table holds no documents.
    pub fn is_empty(&self) -> ShelfDbResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Drops all cached query results.
    pub fn clear_cache(&self) {
        self.query_cache.borrow_mut().clear();
    }

    #[cfg(test)]
    pub(crate) fn cached_queries(&self) -> usize {
        self.query_cache.borrow().len()
    }
}

/// Next id to mint: one past the current maximum, or 1 when empty.
fn next_id(data: &BTreeMap<DocId, Document>) -> DocId {
    data.keys().next_back().map_or(1, |max| max + 1)
}

fn select_targets(
    data: &BTreeMap<DocId, Document>,
    query: Option<&Query>,
    doc_ids: Option<&[DocId]>,
) -> ShelfDbResult<Vec<DocId>> {
    match (query, doc_ids) {
        (Some(_), Some(_)) => Err(ShelfDbError::InvalidSelector(
            "pass either a query or explicit doc ids, not both",
        )),
        (None, None) => Err(ShelfDbError::InvalidSelector(
            "a query or explicit doc ids is required",
        )),
        (Some(query), None) => Ok(data
            .values()
            .filter(|doc| query.matches(doc))
            .map(Document::doc_id)
            .collect()),
        (None, Some(doc_ids)) => Ok(doc_ids
            .iter()
            .copied()
            .filter(|doc_id| data.contains_key(doc_id))
            .collect()),
    }
}
