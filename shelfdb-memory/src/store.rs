//! The in-memory `Storage` implementation.

use shelfdb_core::error::ShelfDbResult;
use shelfdb_core::storage::{Storage, StorageData};

/// Volatile storage holding the full database state in a map.
///
/// A fresh backend reports no state at all, which is distinct from an
/// empty state: the first read returns `None` until something has been
/// written. This mirrors how a file backend behaves on an empty file.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    memory: Option<StorageData>,
}

impl MemoryStorage {
    /// Creates a backend with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with `data`.
    pub fn with_data(data: StorageData) -> Self {
        Self { memory: Some(data) }
    }

    /// Consumes the backend and returns whatever state it holds.
    pub fn into_data(self) -> Option<StorageData> {
        self.memory
    }
}

impl Storage for MemoryStorage {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        Ok(self.memory.clone())
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        self.memory = Some(data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelfdb_core::database::ShelfDb;
    use shelfdb_core::query::field;

    #[test]
    fn fresh_backend_reads_none() {
        let mut storage = MemoryStorage::new();
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut storage = MemoryStorage::new();
        let mut data = StorageData::new();
        data.entry("people".to_string()).or_default().insert(
            "1".to_string(),
            json!({"name": "ada"}).as_object().unwrap().clone(),
        );

        storage.write(&data).unwrap();
        assert_eq!(storage.read().unwrap(), Some(data));
    }

    #[test]
    fn empty_state_is_distinct_from_no_state() {
        let mut storage = MemoryStorage::new();
        storage.write(&StorageData::new()).unwrap();
        assert_eq!(storage.read().unwrap(), Some(StorageData::new()));
    }

    #[test]
    fn backs_a_database() {
        let db = ShelfDb::new(MemoryStorage::new());
        db.insert(json!({"data": 5}).as_object().unwrap().clone())
            .unwrap();
        let hits = db.search(&field("data").eq(5)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id(), 1);
    }
}
