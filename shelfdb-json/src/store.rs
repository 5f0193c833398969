//! The single-file JSON `Storage` implementation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use shelfdb_core::error::ShelfDbResult;
use shelfdb_core::storage::{Storage, StorageData};

/// Storage backend keeping the whole database state in one JSON file.
///
/// The file handle is held open for the lifetime of the backend. Reads
/// deserialize the whole file; writes serialize the whole state, truncate
/// the file to the new length, and flush. An empty or whitespace-only
/// file is treated as "no state yet" rather than a parse error, so the
/// backend can be pointed at a file it has never written.
#[derive(Debug)]
pub struct JsonStorage {
    file: File,
    path: PathBuf,
    pretty: bool,
}

impl JsonStorage {
    /// Opens the file at `path` with default settings, creating it if it
    /// does not exist.
    pub fn open(path: impl AsRef<Path>) -> ShelfDbResult<Self> {
        Self::builder().open(path)
    }

    /// Starts building a backend with non-default settings.
    pub fn builder() -> JsonStorageBuilder {
        JsonStorageBuilder::new()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn read(&mut self) -> ShelfDbResult<Option<StorageData>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        self.file.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let data = serde_json::from_str(&raw)?;
        Ok(Some(data))
    }

    fn write(&mut self, data: &StorageData) -> ShelfDbResult<()> {
        let serialized = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(serialized.as_bytes())?;
        self.file.set_len(serialized.len() as u64)?;
        self.file.flush()?;
        tracing::trace!(path = %self.path.display(), bytes = serialized.len(), "wrote state");
        Ok(())
    }

    fn close(&mut self) -> ShelfDbResult<()> {
        self.file.flush()?;
        tracing::debug!(path = %self.path.display(), "closed json storage");
        Ok(())
    }
}

/// Builder for [`JsonStorage`] backends.
#[derive(Debug, Clone, Default)]
pub struct JsonStorageBuilder {
    pretty: bool,
}

impl JsonStorageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize with indentation. Larger files, but diff- and
    /// human-friendly.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Opens the file at `path`, creating it if it does not exist.
    pub fn open(self, path: impl AsRef<Path>) -> ShelfDbResult<JsonStorage> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        tracing::debug!(path = %path.display(), pretty = self.pretty, "opened json storage");
        Ok(JsonStorage {
            file,
            path,
            pretty: self.pretty,
        })
    }
}
