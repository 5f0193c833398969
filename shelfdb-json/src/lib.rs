//! Single-file JSON storage backend for shelfdb.
//!
//! This crate persists the whole database state to one JSON file on disk.
//! Every write serializes the full state and truncates the file to the new
//! length, so the file on disk is always a complete, self-contained
//! snapshot that survives restarts and can be inspected with any text
//! editor.
//!
//! # Quick Start
//!
//! ```ignore
//! use shelfdb_core::{database::ShelfDb, query::field};
//! use shelfdb_json::JsonStorage;
//! use serde_json::json;
//!
//! let storage = JsonStorage::open("db.json")?;
//! let db = ShelfDb::new(storage);
//! db.insert(json!({"name": "ada"}).as_object().unwrap().clone())?;
//! db.close()?;
//! # Ok::<(), shelfdb_core::error::ShelfDbError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelfdb_json;

pub mod store;

pub use store::{JsonStorage, JsonStorageBuilder};
