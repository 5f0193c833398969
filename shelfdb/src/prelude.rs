//! Convenient re-exports of commonly used types from shelfdb.
//!
//! Import this prelude module to quickly access the most frequently used
//! types without importing from multiple sub-modules:
//!
//! ```ignore
//! use shelfdb::prelude::*;
//! ```
//!
//! This provides access to:
//! - The database handle and its builder
//! - Tables and documents
//! - Query construction
//! - The storage contract and middleware
//! - Error types

pub use shelfdb_core::{
    database::{ShelfDb, ShelfDbBuilder, DEFAULT_TABLE},
    document::{DocId, Document, Fields},
    error::{ShelfDbError, ShelfDbResult},
    middleware::CachingMiddleware,
    query::{field, Field, Query},
    storage::{Storage, StorageData, TableData},
    table::Table,
};
