//! Per-record migration failures.

use thiserror::Error;

use mailstore_core::MessageId;

/// Why a single record failed to migrate.
///
/// These never escape the worker pool or the sweep; they are logged and
/// counted toward a `Partial` result.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Attachment bodies could not be resolved; nothing was written.
    #[error("Failed to load attachments of {id}: {source}")]
    Attachments {
        id: MessageId,
        #[source]
        source: mailstore_core::Error,
    },

    /// V2 write failed; the V1 record was left untouched.
    #[error("Failed to write {id} to V2: {source}")]
    Write {
        id: MessageId,
        #[source]
        source: mailstore_core::Error,
    },

    /// V1 delete failed after a successful write.
    #[error("Failed to delete {id} from V1 after write: {source}")]
    Delete {
        id: MessageId,
        #[source]
        source: mailstore_core::Error,
    },
}

impl MigrationError {
    pub fn message_id(&self) -> MessageId {
        match self {
            MigrationError::Attachments { id, .. }
            | MigrationError::Write { id, .. }
            | MigrationError::Delete { id, .. } => *id,
        }
    }

    /// The record is now present in both stores.
    pub fn is_transient_duplicate(&self) -> bool {
        matches!(self, MigrationError::Delete { .. })
    }
}
