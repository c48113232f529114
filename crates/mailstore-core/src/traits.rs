//! Core traits for mailstore abstractions.
//!
//! These traits define the interfaces the two message representations and the
//! attachment store must satisfy, so the migration engine can run against any
//! backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::mailbox::MailboxPath;
use crate::models::*;

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Legacy (V1) message store.
#[async_trait]
pub trait MessageStoreV1: Send + Sync {
    /// Fetch messages by metadata. Each message comes with a single-use
    /// stream of its attachment references.
    async fn retrieve_messages(
        &self,
        metadata: &[MessageMetadata],
        fetch_type: FetchType,
        limit: Limit,
    ) -> Result<Vec<(MessageWithoutAttachment, AttachmentStream)>>;

    /// Read up to `batch_size` records ordered by id, strictly after `after`.
    /// An empty page means the store is exhausted.
    async fn read_batch(&self, after: Option<MessageId>, batch_size: usize)
        -> Result<Vec<RawMessage>>;

    /// Delete a record. Deleting an absent id succeeds.
    async fn delete(&self, message_id: MessageId) -> Result<()>;
}

/// Current (V2) message store.
#[async_trait]
pub trait MessageStoreV2: Send + Sync {
    /// Write a record, replacing any previous copy with the same id.
    async fn save(&self, message: &RawMessage) -> Result<()>;

    /// Point lookup; a miss carries the metadata needed to find the legacy copy.
    async fn retrieve(&self, metadata: &MessageMetadata) -> Result<MessageResult>;
}

/// Resolves attachment bodies from their references.
#[async_trait]
pub trait AttachmentLoader: Send + Sync {
    async fn load(&self, refs: &[AttachmentRef]) -> Result<Vec<Attachment>>;
}

// =============================================================================
// MAILBOX TRAIT
// =============================================================================

/// Mailbox namespace operations.
///
/// Implementations report conflicts as [`Error::MailboxExists`](crate::Error::MailboxExists),
/// missing sources as [`Error::MailboxNotFound`](crate::Error::MailboxNotFound).
#[async_trait]
pub trait MailboxManager: Send + Sync {
    async fn create_mailbox(&self, path: &MailboxPath) -> Result<()>;

    async fn rename_mailbox(&self, from: &MailboxPath, to: &MailboxPath) -> Result<()>;

    async fn mailbox_exists(&self, path: &MailboxPath) -> Result<bool>;
}

// =============================================================================
// MIGRATION TRAIT
// =============================================================================

/// A migration that can be driven to a terminal status.
#[async_trait]
pub trait Migration: Send + Sync {
    async fn run(&self) -> MigrationResult;
}
