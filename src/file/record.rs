//! File record types and repository for Depot.
//!
//! A `FileRecord` is the durable metadata row behind every stored blob:
//! who owns it, who it is shared with, and the immutable size/type captured
//! at upload. All mutations go through guarded single statements so that
//! concurrent callers never observe a half-applied change.

use sqlx::SqlitePool;

use crate::{DepotError, Result};

/// Set of user ids a file is shared with.
///
/// Always deduplicated and sorted; never contains the file's owner.
/// Persisted as a JSON array in a TEXT column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareSet(Vec<i64>);

impl ShareSet {
    /// Create an empty share set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a share set from user ids, deduplicating as it goes.
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Check whether a user is in the set.
    pub fn contains(&self, user_id: i64) -> bool {
        self.0.binary_search(&user_id).is_ok()
    }

    /// A copy of the set with one user removed.
    pub fn without(&self, user_id: i64) -> Self {
        Self(self.0.iter().copied().filter(|id| *id != user_id).collect())
    }

    /// The ids in the set, sorted ascending.
    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize for the shared_to column.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

impl FromIterator<i64> for ShareSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}

impl TryFrom<String> for ShareSet {
    type Error = serde_json::Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let ids: Vec<i64> = serde_json::from_str(&value)?;
        Ok(Self::from_ids(ids))
    }
}

/// Metadata for a stored file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID, equal to the stored blob name (`{uuid}.{ext}`).
    pub id: String,
    /// Original filename (display name).
    pub filename: String,
    /// User ID of the current owner.
    pub owner_id: i64,
    /// Users granted view/download access.
    #[sqlx(try_from = "String")]
    pub shared_to: ShareSet,
    /// File size in bytes, fixed at upload.
    pub size: i64,
    /// File extension, fixed at upload.
    pub file_type: String,
    /// Mutation counter, bumped by every write.
    pub version: i64,
    /// When the file was uploaded.
    pub created_at: String,
    /// When the record was last changed.
    pub updated_at: String,
}

impl FileRecord {
    /// Check whether a user is the current owner.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Check whether a user is in the share set.
    pub fn is_shared_with(&self, user_id: i64) -> bool {
        self.shared_to.contains(user_id)
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Unique file ID (stored blob name).
    pub id: String,
    /// Original filename (display name).
    pub filename: String,
    /// User ID of the uploader, who becomes the owner.
    pub owner_id: i64,
    /// File size in bytes.
    pub size: i64,
    /// File extension.
    pub file_type: String,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        owner_id: i64,
        size: i64,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            owner_id,
            size,
            file_type: file_type.into(),
        }
    }
}

/// Repository for file record operations.
pub struct FileRecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRecordRepository<'a> {
    /// Create a new FileRecordRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record with an empty share set.
    ///
    /// An id collision is rejected with `Conflict`; the existing record is
    /// never overwritten.
    pub async fn create(&self, new_record: &NewFileRecord) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO file_records (id, filename, owner_id, size, file_type)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_record.id)
        .bind(&new_record.filename)
        .bind(new_record.owner_id)
        .bind(new_record.size)
        .bind(&new_record.file_type)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                DepotError::Conflict(format!("file id {} already exists", new_record.id))
            } else {
                DepotError::Database(e.to_string())
            }
        })?;

        self.get_by_id(&new_record.id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let result = sqlx::query_as::<_, FileRecord>(
            "SELECT id, filename, owner_id, shared_to, size, file_type, version,
                    created_at, updated_at
             FROM file_records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List all file records (newest first), one consistent snapshot.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(
            "SELECT id, filename, owner_id, shared_to, size, file_type, version,
                    created_at, updated_at
             FROM file_records ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(records)
    }

    /// List file records owned by a user (newest first).
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(
            "SELECT id, filename, owner_id, shared_to, size, file_type, version,
                    created_at, updated_at
             FROM file_records WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(records)
    }

    /// Atomically hand the record to a new owner, compare-and-swap on version.
    ///
    /// The share set is written in the same statement (callers pass the set
    /// with the new owner filtered out). Returns false if the record changed
    /// since `expected_version` was read, or no longer exists.
    pub async fn transfer_owner(
        &self,
        id: &str,
        new_owner_id: i64,
        shares: &ShareSet,
        expected_version: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE file_records
             SET owner_id = ?, shared_to = ?, version = version + 1, updated_at = datetime('now')
             WHERE id = ? AND version = ?",
        )
        .bind(new_owner_id)
        .bind(shares.to_json())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the share set wholesale, guarded on current ownership.
    ///
    /// Returns false if `owner_id` no longer owns the record (or it is gone).
    pub async fn replace_shares(&self, id: &str, owner_id: i64, shares: &ShareSet) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE file_records
             SET shared_to = ?, version = version + 1, updated_at = datetime('now')
             WHERE id = ? AND owner_id = ?",
        )
        .bind(shares.to_json())
        .bind(id)
        .bind(owner_id)
        .execute(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a record, guarded on current ownership.
    ///
    /// Returns false if `owner_id` no longer owns the record (or it is gone).
    pub async fn delete_owned(&self, id: &str, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM file_records WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all file records.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_records")
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Count file records owned by a user.
    pub async fn count_by_owner(&self, owner_id: i64) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_records WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(count)
    }
}
