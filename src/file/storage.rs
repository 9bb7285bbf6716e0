//! Blob storage for Depot.
//!
//! This module provides the physical side of the file store:
//! - UUID-based stored names (the stored name doubles as the record id)
//! - Directory sharding by first 2 characters of the name
//! - Save, load, and delete operations
//!
//! Blob I/O never runs inside a metadata critical section; the record row
//! and the blob are reconciled by operation ordering, not by locking.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{DepotError, Result};

/// On-disk blob store.
///
/// Blobs are kept in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for blob storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save content under a fresh UUID-based name.
    ///
    /// `original_name` only contributes its extension. Returns the stored
    /// name (`{uuid}.{ext}`), which callers use as the file record id.
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        let stored_name = format!("{uuid}.{ext}");

        self.save_with_name(content, &stored_name)?;
        Ok(stored_name)
    }

    /// Save content under a specific stored name.
    pub fn save_with_name(&self, content: &[u8], stored_name: &str) -> Result<()> {
        let file_path = self.get_file_path(stored_name);

        // Create the shard directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&file_path, content)?;

        Ok(())
    }

    /// Load a blob by stored name.
    ///
    /// Returns `NotFound` when the blob is absent.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.get_file_path(stored_name);

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(format!("File: {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it didn't exist.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.get_file_path(stored_name);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        let file_path = self.get_file_path(stored_name);
        file_path.exists()
    }

    /// Get the size of a stored blob.
    ///
    /// Returns `NotFound` when the blob is absent.
    pub fn file_size(&self, stored_name: &str) -> Result<u64> {
        let file_path = self.get_file_path(stored_name);

        match fs::metadata(&file_path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(format!("File: {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the full path for a stored name: {base_path}/{shard}/{stored_name}.
    pub fn get_file_path(&self, stored_name: &str) -> PathBuf {
        let shard = Self::get_shard(stored_name);
        self.base_path.join(shard).join(stored_name)
    }

    /// Shard directory for a stored name (its first 2 characters).
    fn get_shard(stored_name: &str) -> &str {
        if stored_name.len() >= 2 {
            &stored_name[..2]
        } else {
            stored_name
        }
    }

    /// Extract the file extension from a filename.
    ///
    /// Returns "bin" if no extension is found.
    pub fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin")
    }
}
