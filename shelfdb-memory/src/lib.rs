//! In-memory storage backend for shelfdb.
//!
//! This crate provides the simplest implementation of the `Storage` trait:
//! the whole database state lives in a map inside the backend and is lost
//! when the backend is dropped. It is the backend of choice for tests,
//! prototypes, and caches that do not need to survive a restart.
//!
//! # Quick Start
//!
//! ```ignore
//! use shelfdb_core::{database::ShelfDb, query::field};
//! use shelfdb_memory::MemoryStorage;
//! use serde_json::json;
//!
//! let db = ShelfDb::new(MemoryStorage::new());
//! db.insert(json!({"name": "ada"}).as_object().unwrap().clone())?;
//! assert!(db.contains(&field("name").eq("ada"))?);
//! # Ok::<(), shelfdb_core::error::ShelfDbError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelfdb_memory;

pub mod store;

pub use store::MemoryStorage;
