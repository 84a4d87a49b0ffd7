//! Error types for the synchronization engine.
//!
//! All fallible operations return [`Result<T>`], an alias over [`SyncError`].
//!
//! # Recovery
//!
//! | Variant | Recoverable | Caller action |
//! |---------|-------------|---------------|
//! | [`SyncError::NoSuchDocument`] | yes | call `add_document` first |
//! | [`SyncError::VersionMismatch`] | no | re-seed the document |
//! | [`SyncError::Patch`] | depends | inspect the diff primitive |
//! | [`SyncError::InvalidMessage`] | yes | drop the message |
//! | [`SyncError::Json`] | yes | drop the message |

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the engine, the stores and the wire codec.
#[derive(Debug, Error)]
pub enum SyncError {
    /// `diff`/`patch` was invoked for an id never passed to `add_document`.
    #[error("No such document: '{0}'")]
    NoSuchDocument(String),

    /// The edit that triggered a rollback does not line up with the retained backup.
    ///
    /// The session for this document cannot heal itself.
    #[error("Edit's clientVersion '{edit}' does not match the backup's clientVersion '{backup}'")]
    VersionMismatch {
        /// `clientVersion` carried by the incoming edit
        edit: i64,
        /// `clientVersion` of the stored backup
        backup: u64,
    },

    /// The diff/patch primitive could not produce or apply a diff set.
    #[error("Patch error: {0}")]
    Patch(String),

    /// A decoded message was not a valid patch message.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether this error leaves the document's sync session broken.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::VersionMismatch { .. })
    }

    /// Whether the caller must re-seed the document to resume syncing.
    pub fn requires_reseed(&self) -> bool {
        self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_message() {
        let err = SyncError::VersionMismatch { edit: 3, backup: 1 };
        assert_eq!(
            err.to_string(),
            "Edit's clientVersion '3' does not match the backup's clientVersion '1'"
        );
        assert!(err.is_fatal());
        assert!(err.requires_reseed());
    }

    #[test]
    fn test_no_such_document_not_fatal() {
        let err = SyncError::NoSuchDocument("d1".to_string());
        assert_eq!(err.to_string(), "No such document: 'd1'");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Json(_)));
    }
}
