//! File management module for Depot.
//!
//! This module provides the file lifecycle including:
//! - Upload with blob-first write ordering
//! - Per-file ownership with share and transfer
//! - Access decisions separated from enforcement
//! - Sharded blob storage with UUID naming

mod access;
mod record;
mod service;
mod storage;

pub use access::{decide, Action, Verdict};
pub use record::{FileRecord, FileRecordRepository, NewFileRecord, ShareSet};
pub use service::FileService;
pub use storage::FileStorage;

/// Maximum length for filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Maximum number of users a single file can be shared with.
pub const MAX_SHARE_TARGETS: usize = 100;
