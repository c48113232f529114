//! Copy-then-delete migration of a single record.

use std::collections::HashSet;
use std::sync::Arc;

use mailstore_core::{
    AttachmentId, AttachmentLoader, Error, MessageStoreV1, MessageStoreV2, RawMessage,
};

use crate::error::MigrationError;
use crate::queue::MigrationTask;

/// The collaborators a migration needs. Clones share the same stores.
#[derive(Clone)]
pub struct MigrationStores {
    pub v1: Arc<dyn MessageStoreV1>,
    pub v2: Arc<dyn MessageStoreV2>,
    pub attachments: Arc<dyn AttachmentLoader>,
}

impl MigrationStores {
    pub fn new(
        v1: Arc<dyn MessageStoreV1>,
        v2: Arc<dyn MessageStoreV2>,
        attachments: Arc<dyn AttachmentLoader>,
    ) -> Self {
        Self {
            v1,
            v2,
            attachments,
        }
    }

    /// Write the record to V2, then delete it from V1.
    ///
    /// The delete is only issued once the write is acknowledged. A record
    /// already gone from V1 rewrites the same V2 copy and the delete is a
    /// no-op.
    pub async fn copy_then_delete(&self, raw: &RawMessage) -> Result<(), MigrationError> {
        let id = raw.message_id();
        self.v2
            .save(raw)
            .await
            .map_err(|source| MigrationError::Write { id, source })?;
        self.v1
            .delete(id)
            .await
            .map_err(|source| MigrationError::Delete { id, source })
    }

    /// Migrate a queued task: resolve its attachments, then copy-then-delete.
    ///
    /// V2 stores attachment references, not bodies, so the loaded bodies only
    /// prove every reference resolves. A reference the loader did not return
    /// fails the task before anything is written.
    pub async fn migrate_task(&self, task: MigrationTask) -> Result<(), MigrationError> {
        let id = task.message_id();
        let loaded = self
            .attachments
            .load(&task.attachments)
            .await
            .map_err(|source| MigrationError::Attachments { id, source })?;

        let resolved: HashSet<AttachmentId> = loaded.iter().map(|a| a.id).collect();
        if let Some(missing) = task
            .attachments
            .iter()
            .find(|r| !resolved.contains(&r.attachment_id))
        {
            return Err(MigrationError::Attachments {
                id,
                source: Error::AttachmentNotFound(missing.attachment_id),
            });
        }

        self.copy_then_delete(&task.into_raw()).await
    }
}
