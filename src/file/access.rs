//! Access decisions for file operations.
//!
//! A single pure function answers every "may this user do that to this
//! file?" question. It never touches storage and never fails; callers that
//! need an error translate a deny themselves.

use super::record::FileRecord;

/// An operation a user can attempt on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a new file. Open to any signed-in user.
    Upload,
    /// See the record in listings and metadata reads.
    View,
    /// Fetch the stored bytes.
    Download,
    /// Replace the share set.
    Share,
    /// Hand ownership to another user.
    Transfer,
    /// Remove the file.
    Delete,
}

/// The outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    /// True when the action may proceed.
    pub fn allows(self) -> bool {
        self == Verdict::Allow
    }
}

/// Decide whether `user_id` may perform `action` on `record`.
///
/// View and download are granted to the owner and anyone in the share set.
/// Share, transfer and delete are owner-only; being in the share set never
/// satisfies them. Upload has no record precondition and is always allowed
/// for a resolved user.
pub fn decide(action: Action, record: &FileRecord, user_id: i64) -> Verdict {
    let allowed = match action {
        Action::Upload => true,
        Action::View | Action::Download => {
            record.is_owned_by(user_id) || record.is_shared_with(user_id)
        }
        Action::Share | Action::Transfer | Action::Delete => record.is_owned_by(user_id),
    };

    if allowed {
        Verdict::Allow
    } else {
        Verdict::Deny
    }
}
