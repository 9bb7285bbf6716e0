//! File lifecycle operations for Depot.
//!
//! `FileService` ties the metadata store, the access decisions and the blob
//! store together: upload, listing, download, share, ownership transfer and
//! delete. It is the only layer that raises the domain error kinds; the
//! access module never fails and the repositories only report storage
//! trouble.

use tracing::{debug, warn};

use crate::db::{Database, UserRepository};
use crate::{DepotError, Result};

use super::access::{decide, Action};
use super::record::{FileRecord, FileRecordRepository, NewFileRecord, ShareSet};
use super::storage::FileStorage;
use super::{MAX_FILENAME_LENGTH, MAX_SHARE_TARGETS};

/// Validate an upload filename.
fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(DepotError::Validation("filename is required".to_string()));
    }
    let char_count = filename.chars().count();
    if char_count > MAX_FILENAME_LENGTH {
        return Err(DepotError::Validation(format!(
            "filename too long (max {MAX_FILENAME_LENGTH} characters)"
        )));
    }
    Ok(())
}

/// Service for file lifecycle operations with access checking.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
}

impl<'a> FileService<'a> {
    /// Create a new FileService over the given database and blob store.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self { db, storage }
    }

    /// Store a new file owned by `user_id`.
    ///
    /// The blob is written first, then the metadata row; if the row cannot
    /// be written the blob is removed again so disk and store agree. The
    /// stored blob name becomes the record id.
    pub async fn upload(&self, content: &[u8], filename: &str, user_id: i64) -> Result<FileRecord> {
        validate_filename(filename)?;

        let stored_name = self.storage.save(content, filename)?;

        let new_record = NewFileRecord::new(
            &stored_name,
            filename,
            user_id,
            content.len() as i64,
            FileStorage::extract_extension(filename),
        );

        let repo = FileRecordRepository::new(self.db.pool());
        match repo.create(&new_record).await {
            Ok(record) => {
                debug!("Uploaded {} as {}", filename, record.id);
                Ok(record)
            }
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&stored_name) {
                    warn!(
                        "Failed to remove blob {} after metadata failure: {}",
                        stored_name, cleanup_err
                    );
                }
                Err(e)
            }
        }
    }

    /// List every file `user_id` may view, newest first.
    ///
    /// One snapshot of the store, filtered through the access decisions.
    pub async fn list_visible(&self, user_id: i64) -> Result<Vec<FileRecord>> {
        let repo = FileRecordRepository::new(self.db.pool());
        let records = repo.list_all().await?;

        Ok(records
            .into_iter()
            .filter(|record| decide(Action::View, record, user_id).allows())
            .collect())
    }

    /// Get a single record, enforcing view access.
    pub async fn get(&self, id: &str, user_id: i64) -> Result<FileRecord> {
        let repo = FileRecordRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !decide(Action::View, &record, user_id).allows() {
            return Err(DepotError::Permission(
                "you do not have access to this file".to_string(),
            ));
        }

        Ok(record)
    }

    /// Fetch a file's bytes, enforcing download access.
    ///
    /// Returns the record and the exact stored content. A record whose blob
    /// has gone missing is a storage failure, not a clean miss.
    pub async fn download(&self, id: &str, user_id: i64) -> Result<(FileRecord, Vec<u8>)> {
        let repo = FileRecordRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !decide(Action::Download, &record, user_id).allows() {
            return Err(DepotError::Permission(
                "you do not have access to this file".to_string(),
            ));
        }

        let content = match self.storage.load(&record.id) {
            Ok(content) => content,
            Err(DepotError::NotFound(_)) => {
                return Err(DepotError::Database(format!(
                    "blob missing for file {}",
                    record.id
                )));
            }
            Err(e) => return Err(e),
        };

        Ok((record, content))
    }

    /// Hand a file to a new owner.
    ///
    /// Owner-only. The share set is carried over unchanged except that the
    /// new owner is dropped from it; the old owner is NOT granted a share.
    /// The swap is a compare-and-swap on the record version, retried while
    /// the caller still owns the file, so concurrent transfers have exactly
    /// one winner.
    pub async fn transfer(
        &self,
        id: &str,
        user_id: i64,
        new_owner_username: &str,
    ) -> Result<FileRecord> {
        let repo = FileRecordRepository::new(self.db.pool());
        let users = UserRepository::new(self.db.pool());

        let mut record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !decide(Action::Transfer, &record, user_id).allows() {
            return Err(DepotError::Permission(
                "only the owner can transfer this file".to_string(),
            ));
        }

        let target = users
            .get_by_username(new_owner_username)
            .await?
            .ok_or_else(|| {
                DepotError::InvalidTarget(format!("unknown user: {new_owner_username}"))
            })?;

        loop {
            let shares = record.shared_to.without(target.id);
            if repo
                .transfer_owner(id, target.id, &shares, record.version)
                .await?
            {
                debug!("Transferred {} to {}", id, target.username);
                return repo
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| DepotError::NotFound("file".to_string()));
            }

            // Lost the swap; re-read and re-check before trying again
            record = repo
                .get_by_id(id)
                .await?
                .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

            if !decide(Action::Transfer, &record, user_id).allows() {
                return Err(DepotError::Permission(
                    "only the owner can transfer this file".to_string(),
                ));
            }
        }
    }

    /// Replace a file's share set wholesale.
    ///
    /// Owner-only. Every username must resolve to a known user or the whole
    /// call fails with no partial write. The resolved set is deduplicated
    /// and never contains the owner. Passing an empty list revokes all
    /// shares.
    pub async fn share(&self, id: &str, user_id: i64, usernames: &[String]) -> Result<FileRecord> {
        if usernames.len() > MAX_SHARE_TARGETS {
            return Err(DepotError::Validation(format!(
                "too many share targets (max {MAX_SHARE_TARGETS})"
            )));
        }

        let repo = FileRecordRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !decide(Action::Share, &record, user_id).allows() {
            return Err(DepotError::Permission(
                "only the owner can share this file".to_string(),
            ));
        }

        let users = UserRepository::new(self.db.pool());
        let mut ids = Vec::with_capacity(usernames.len());
        for username in usernames {
            let user = users
                .get_by_username(username)
                .await?
                .ok_or_else(|| DepotError::InvalidTarget(format!("unknown user: {username}")))?;
            ids.push(user.id);
        }

        // The owner never sits in their own share set
        let shares = ShareSet::from_ids(ids).without(record.owner_id);

        if repo.replace_shares(id, user_id, &shares).await? {
            repo.get_by_id(id)
                .await?
                .ok_or_else(|| DepotError::NotFound("file".to_string()))
        } else {
            // Ownership moved (or the record vanished) between read and write
            match repo.get_by_id(id).await? {
                Some(_) => Err(DepotError::Permission(
                    "only the owner can share this file".to_string(),
                )),
                None => Err(DepotError::NotFound("file".to_string())),
            }
        }
    }

    /// Delete a file.
    ///
    /// Owner-only. The metadata row goes first, then the blob: a crash in
    /// between leaves an invisible orphan blob rather than a record that
    /// promises bytes that are gone. Blob removal failures are logged, not
    /// surfaced.
    pub async fn delete(&self, id: &str, user_id: i64) -> Result<()> {
        let repo = FileRecordRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !decide(Action::Delete, &record, user_id).allows() {
            return Err(DepotError::Permission(
                "only the owner can delete this file".to_string(),
            ));
        }

        if !repo.delete_owned(id, user_id).await? {
            return match repo.get_by_id(id).await? {
                Some(_) => Err(DepotError::Permission(
                    "only the owner can delete this file".to_string(),
                )),
                None => Err(DepotError::NotFound("file".to_string())),
            };
        }

        match self.storage.delete(id) {
            Ok(true) => debug!("Deleted {}", id),
            Ok(false) => warn!("Blob for {} was already missing at delete", id),
            Err(e) => warn!("Failed to delete blob {}: {}", id, e),
        }

        Ok(())
    }
}
