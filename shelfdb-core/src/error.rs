//! Error and result types for document store operations.
//!
//! Use [`ShelfDbResult<T>`] as the return type for fallible operations.
//!
//! The error policy follows a small taxonomy: argument errors
//! ([`ShelfDbError::InvalidSelector`]) fail immediately and are never
//! retried; lookup misses (missing table, document id, or field path) are
//! absorbed as empty results or no-ops at the table layer and never appear
//! here; backend I/O and serialization failures propagate to the caller
//! unchanged so they can decide policy.

use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the store.
#[derive(Error, Debug)]
pub enum ShelfDbError {
    /// The backing file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// The persisted state could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    /// A document id key in the persisted state is not a decimal integer.
    #[error("invalid document id {0:?} in table {1:?}")]
    InvalidDocId(String, String),
    /// Conflicting or missing selectors supplied to `update` or `remove`.
    #[error("invalid selector: {0}")]
    InvalidSelector(&'static str),
    /// An error reported by a custom storage backend.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A specialized `Result` type for document store operations.
pub type ShelfDbResult<T> = Result<T, ShelfDbError>;
