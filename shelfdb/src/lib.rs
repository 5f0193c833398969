//! Main shelfdb crate providing a unified interface to the embedded
//! document store.
//!
//! This crate is the primary entry point for users of shelfdb. It
//! re-exports the core types from the sub-crates and provides convenient
//! access to the storage backends.
//!
//! # Features
//!
//! - **Schemaless documents** - Store JSON objects under integer ids, no
//!   schema declarations required
//! - **Multiple backends** - In-memory and single-file JSON storage with
//!   an extensible trait system
//! - **Composable queries** - Field predicates combined with `&`, `|`,
//!   and `!`
//! - **Write buffering** - Optional caching middleware between the
//!   database and any backend
//!
//! # Quick Start
//!
//! ```ignore
//! use shelfdb::{prelude::*, memory::MemoryStorage};
//! use serde_json::json;
//!
//! fn main() -> ShelfDbResult<()> {
//!     let db = ShelfDb::new(MemoryStorage::new());
//!
//!     db.insert(json!({"name": "ada", "age": 36}).as_object().unwrap().clone())?;
//!     db.insert(json!({"name": "grace", "age": 85}).as_object().unwrap().clone())?;
//!
//!     let senior = field("age").gt(50);
//!     for doc in db.search(&senior)? {
//!         println!("{}: {:?}", doc.doc_id(), doc.fields());
//!     }
//!
//!     // Tables beyond the default one
//!     let pets = db.table("pets");
//!     pets.insert(json!({"name": "rex", "kind": "dog"}).as_object().unwrap().clone())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Persistence
//!
//! ```ignore
//! use shelfdb::{prelude::*, json::JsonStorage, middleware::CachingMiddleware};
//!
//! // Buffer writes in memory, flushing to disk every 100 writes and on
//! // close.
//! let storage = CachingMiddleware::with_write_cache_size(
//!     JsonStorage::open("db.json")?,
//!     100,
//! );
//! let db = ShelfDb::new(storage);
//! # Ok::<(), shelfdb::error::ShelfDbError>(())
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Volatile storage for development and testing
//! - [`json`] - Single-file JSON persistence (requires the default `json`
//!   feature)

pub mod prelude;

pub use shelfdb_core::{cache, database, document, error, middleware, proxy, query, storage, table};

/// In-memory storage backend.
pub mod memory {
    pub use shelfdb_memory::MemoryStorage;
}

/// Single-file JSON storage backend.
///
/// This module is only available when the `json` feature is enabled
/// (it is part of the default feature set).
#[cfg(feature = "json")]
pub mod json {
    pub use shelfdb_json::{JsonStorage, JsonStorageBuilder};
}
