//! Legacy (V1) message store held in memory.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use mailstore_core::logging::{COMPONENT_MEMORY_STORE, SUBSYSTEM_STORE};
use mailstore_core::{
    AttachmentStream, Error, FetchType, Limit, MessageId, MessageMetadata, MessageStoreV1,
    MessageWithoutAttachment, RawMessage, Result,
};

#[derive(Default)]
struct V1State {
    messages: BTreeMap<MessageId, RawMessage>,
    failing_deletes: HashSet<MessageId>,
    deletes: u64,
}

/// V1 store keeping records ordered by id so batches page deterministically.
#[derive(Clone, Default)]
pub struct InMemoryMessageStoreV1 {
    state: Arc<RwLock<V1State>>,
}

impl InMemoryMessageStoreV1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub async fn insert(&self, message: RawMessage) {
        let mut state = self.state.write().await;
        state.messages.insert(message.message_id(), message);
    }

    pub async fn get(&self, message_id: MessageId) -> Option<RawMessage> {
        self.state.read().await.messages.get(&message_id).cloned()
    }

    pub async fn contains(&self, message_id: MessageId) -> bool {
        self.state.read().await.messages.contains_key(&message_id)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of delete calls that removed a record.
    pub async fn delete_count(&self) -> u64 {
        self.state.read().await.deletes
    }

    /// Make every delete of `message_id` fail until cleared.
    pub async fn fail_delete_for(&self, message_id: MessageId) {
        self.state.write().await.failing_deletes.insert(message_id);
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.failing_deletes.clear();
    }
}

fn project(message: &MessageWithoutAttachment, fetch_type: FetchType) -> MessageWithoutAttachment {
    let mut projected = message.clone();
    match fetch_type {
        FetchType::Full | FetchType::Body => {}
        FetchType::Headers => projected.content.truncate(message.body_start as usize),
        FetchType::Metadata => projected.content.clear(),
    }
    projected
}

#[async_trait]
impl MessageStoreV1 for InMemoryMessageStoreV1 {
    async fn retrieve_messages(
        &self,
        metadata: &[MessageMetadata],
        fetch_type: FetchType,
        limit: Limit,
    ) -> Result<Vec<(MessageWithoutAttachment, AttachmentStream)>> {
        let state = self.state.read().await;
        let found: Vec<(MessageWithoutAttachment, AttachmentStream)> = metadata
            .iter()
            .filter_map(|meta| state.messages.get(&meta.message_id))
            .map(|raw| {
                let attachments: AttachmentStream = if fetch_type == FetchType::Full {
                    Box::new(raw.attachments.clone().into_iter())
                } else {
                    Box::new(std::iter::empty())
                };
                (project(&raw.message, fetch_type), attachments)
            })
            .collect();

        trace!(
            subsystem = SUBSYSTEM_STORE,
            component = COMPONENT_MEMORY_STORE,
            requested = metadata.len(),
            found = found.len(),
            ?fetch_type,
            "V1 retrieve"
        );
        Ok(limit.apply(found))
    }

    async fn read_batch(
        &self,
        after: Option<MessageId>,
        batch_size: usize,
    ) -> Result<Vec<RawMessage>> {
        let state = self.state.read().await;
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        Ok(state
            .messages
            .range((lower, Bound::Unbounded))
            .take(batch_size)
            .map(|(_, raw)| raw.clone())
            .collect())
    }

    async fn delete(&self, message_id: MessageId) -> Result<()> {
        let mut state = self.state.write().await;
        if state.failing_deletes.contains(&message_id) {
            return Err(Error::Storage(format!(
                "injected delete failure for {}",
                message_id
            )));
        }
        if state.messages.remove(&message_id).is_some() {
            state.deletes += 1;
            debug!(
                subsystem = SUBSYSTEM_STORE,
                component = COMPONENT_MEMORY_STORE,
                message_id = %message_id,
                "V1 record deleted"
            );
        }
        Ok(())
    }
}
