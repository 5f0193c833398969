//! Write-buffering and re-read caching over any [`Storage`].
//!
//! [`CachingMiddleware`] decorates a backend: reads are served from an
//! in-memory copy of the last-known state once warm, and writes are
//! buffered until a write-count threshold is reached or the middleware is
//! closed. Stacking it over a file backend avoids re-parsing the file on
//! every access and coalesces bursts of writes.
//!
//! Writes buffered since the last flush are lost if [`Storage::close`] is
//! never called; treat a database holding this middleware as a scoped
//! resource and close it on every exit path.

use tracing::debug;

use crate::error::ShelfDbResult;
use crate::storage::{Storage, StorageData};

/// Flush after every write unless configured otherwise.
pub const DEFAULT_WRITE_CACHE_SIZE: usize = 1;

/// A [`Storage`] decorator that buffers writes and caches reads.
pub struct CachingMiddleware<S> {
    storage: S,
    /// Last-known full state; `None` until the first read or write.
    cache: Option<StorageData>,
    /// Number of writes buffered since the last flush.
    pending: usize,
    /// Flush once this many writes have accumulated.
    write_cache_size: usize,
}

impl<S: Storage> CachingMiddleware<S> {
    /// Wraps `storage`, flushing on every write.
    pub fn new(storage: S) -> Self {
        Self::with_write_cache_size(storage, DEFAULT_WRITE_CACHE_SIZE)
    }

    /// Wraps `storage`, flushing once every `write_cache_size` writes.
    pub fn with_write_cache_size(storage: S, write_cache_size: usize) -> Self {
        Self {
            storage,
            cache: None,
            pending: 0,
            write_cache_size,
        }
    }

    /// Writes any buffered state through to the wrapped storage.
    pub fn flush(&mut self) -> ShelfDbResult<()> {
        if self.pending > 0 {
            if let Some(data) = &self.cache {
                debug!(pending = self.pending, "flushing buffered writes to storage");
                self.storage.write(data)?;
            }
            self.pending = 0;
        }
        Ok(())
    }

    /// Consumes the middleware, returning the wrapped storage.
    ///
    /// Buffered writes are not flushed; call [`CachingMiddleware::flush`]
    /// first if they matter.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: Storage> Storage for CachingMiddleware<S> {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        if let Some(data) = &self.cache {
            return Ok(Some(data.clone()));
        }
        let data = self.storage.read()?;
        self.cache = data.clone();
        Ok(data)
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        // The cache is updated unconditionally so reads within this session
        // observe the write even while it is still buffered.
        self.cache = Some(data.clone());
        self.pending += 1;
        if self.pending >= self.write_cache_size {
            self.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> ShelfDbResult<()> {
        self.flush()?;
        self.storage.close()
    }
}
