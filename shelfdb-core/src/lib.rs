//! An embedded document store that persists collections of semi-structured
//! records under named tables, using a pluggable storage backend.
//!
//! This crate is the core of the shelfdb project and provides:
//!
//! - **Storage contract** ([`storage`]) - The trait that persistence backends implement
//! - **Caching middleware** ([`middleware`]) - Write buffering and re-read caching over any backend
//! - **Storage proxy** ([`proxy`]) - A narrowing adapter exposing one table's slice of the state
//! - **Documents and tables** ([`document`], [`table`]) - Records with integer identities and
//!   the collections that own them
//! - **Query engine** ([`query`]) - Composable field predicates with logical combinators
//! - **Database** ([`database`]) - Top-level handle owning the backend and table instances
//! - **LRU cache** ([`cache`]) - The recency-ordered cache backing query results
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use shelfdb_core::{database::ShelfDb, query::field};
//! use shelfdb_memory::MemoryStorage;
//! use serde_json::json;
//!
//! let db = ShelfDb::new(MemoryStorage::new());
//! db.insert(json!({"data": 5}).as_object().unwrap().clone())?;
//! let hits = db.search(&field("data").eq(5))?;
//! assert_eq!(hits[0].doc_id(), 1);
//! # Ok::<(), shelfdb_core::error::ShelfDbError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelfdb_core;

pub mod cache;
pub mod database;
pub mod document;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod query;
pub mod storage;
pub mod table;

mod evaluator;

#[cfg(test)]
pub(crate) mod testutil;
