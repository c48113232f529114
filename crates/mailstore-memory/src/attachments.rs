//! Attachment bodies held in memory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mailstore_core::{Attachment, AttachmentId, AttachmentLoader, AttachmentRef, Error, Result};

#[derive(Default)]
struct AttachmentState {
    attachments: HashMap<AttachmentId, Attachment>,
    unavailable: bool,
}

/// Attachment store that fails on unknown references.
#[derive(Clone, Default)]
pub struct InMemoryAttachmentStore {
    state: Arc<RwLock<AttachmentState>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an attachment body and return a reference to it.
    pub async fn store(&self, content_type: &str, bytes: impl Into<Vec<u8>>) -> AttachmentRef {
        let attachment = Attachment {
            id: AttachmentId::new(),
            content_type: content_type.to_string(),
            bytes: bytes.into(),
        };
        let reference = AttachmentRef::new(attachment.id);
        self.state
            .write()
            .await
            .attachments
            .insert(attachment.id, attachment);
        reference
    }

    /// Make every load fail, as if the backend were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

#[async_trait]
impl AttachmentLoader for InMemoryAttachmentStore {
    async fn load(&self, refs: &[AttachmentRef]) -> Result<Vec<Attachment>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(Error::Storage("attachment store unavailable".into()));
        }
        refs.iter()
            .map(|r| {
                state
                    .attachments
                    .get(&r.attachment_id)
                    .cloned()
                    .ok_or(Error::AttachmentNotFound(r.attachment_id))
            })
            .collect()
    }
}
