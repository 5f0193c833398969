//! Shared helpers for unit tests.

use serde_json::{json, Value};

use crate::document::Fields;
use crate::error::ShelfDbResult;
use crate::storage::{Storage, StorageData, TableData};

/// Builds a field mapping from a JSON object literal.
pub(crate) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A minimal in-process backend for exercising the layers above storage.
#[derive(Default)]
pub(crate) struct MemStorage {
    pub(crate) data: Option<StorageData>,
}

impl Storage for MemStorage {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        self.data = Some(data.clone());
        Ok(())
    }
}

/// A backend that records how often it is touched.
#[derive(Default)]
pub(crate) struct CountingStorage {
    pub(crate) data: Option<StorageData>,
    pub(crate) reads: usize,
    pub(crate) writes: usize,
}

impl Storage for CountingStorage {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        self.reads += 1;
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        self.writes += 1;
        self.data = Some(data.clone());
        Ok(())
    }
}

/// A one-table state whose single document carries the given marker value.
pub(crate) fn state_with(table: &str, marker: i64) -> StorageData {
    let mut table_data = TableData::new();
    table_data.insert("1".to_string(), fields(json!({"marker": marker})));
    let mut state = StorageData::new();
    state.insert(table.to_string(), table_data);
    state
}
