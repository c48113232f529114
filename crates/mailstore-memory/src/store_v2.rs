//! Current (V2) message store held in memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use mailstore_core::logging::{COMPONENT_MEMORY_STORE, SUBSYSTEM_STORE};
use mailstore_core::{
    Error, MessageId, MessageMetadata, MessageResult, MessageStoreV2, RawMessage, Result,
};

#[derive(Default)]
struct V2State {
    messages: HashMap<MessageId, RawMessage>,
    failing_saves: HashSet<MessageId>,
    save_latency: Option<Duration>,
    saves: u64,
}

/// V2 store with upsert semantics.
#[derive(Clone, Default)]
pub struct InMemoryMessageStoreV2 {
    state: Arc<RwLock<V2State>>,
}

impl InMemoryMessageStoreV2 {
    pub fn new() -> Self {
        Self::default()
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

    /// Number of successful saves, including overwrites.
    pub async fn save_count(&self) -> u64 {
        self.state.read().await.saves
    }

    /// Make every save of `message_id` fail until cleared.
    pub async fn fail_save_for(&self, message_id: MessageId) {
        self.state.write().await.failing_saves.insert(message_id);
    }

    /// Delay each save by `latency` before it is acknowledged.
    pub async fn set_save_latency(&self, latency: Duration) {
        self.state.write().await.save_latency = Some(latency);
    }

    pub async fn clear_faults(&self) {
        let mut state = self.state.write().await;
        state.failing_saves.clear();
        state.save_latency = None;
    }
}

#[async_trait]
impl MessageStoreV2 for InMemoryMessageStoreV2 {
    async fn save(&self, message: &RawMessage) -> Result<()> {
        let message_id = message.message_id();
        let latency = {
            let state = self.state.read().await;
            if state.failing_saves.contains(&message_id) {
                return Err(Error::Storage(format!(
                    "injected save failure for {}",
                    message_id
                )));
            }
            state.save_latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;
        state.messages.insert(message_id, message.clone());
        state.saves += 1;
        debug!(
            subsystem = SUBSYSTEM_STORE,
            component = COMPONENT_MEMORY_STORE,
            message_id = %message_id,
            "V2 record saved"
        );
        Ok(())
    }

    async fn retrieve(&self, metadata: &MessageMetadata) -> Result<MessageResult> {
        let state = self.state.read().await;
        Ok(match state.messages.get(&metadata.message_id) {
            Some(raw) => MessageResult::Found(raw.clone()),
            None => MessageResult::NotFound(*metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::raw_message;

    #[tokio::test]
    async fn test_save_then_retrieve() {
        let store = InMemoryMessageStoreV2::new();
        let raw = raw_message("Subject: a\r\n\r\nbody");
        store.save(&raw).await.unwrap();

        match store.retrieve(raw.metadata()).await.unwrap() {
            MessageResult::Found(found) => assert_eq!(found, raw),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retrieve_miss_carries_metadata() {
        let store = InMemoryMessageStoreV2::new();
        let raw = raw_message("x");
        let result = store.retrieve(raw.metadata()).await.unwrap();
        assert_eq!(result, MessageResult::NotFound(*raw.metadata()));
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = InMemoryMessageStoreV2::new();
        let raw = raw_message("x");
        store.save(&raw).await.unwrap();
        store.save(&raw).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.save_count().await, 2);
    }

    #[tokio::test]
    async fn test_injected_save_failure() {
        let store = InMemoryMessageStoreV2::new();
        let raw = raw_message("x");
        store.fail_save_for(raw.message_id()).await;

        assert!(store.save(&raw).await.is_err());
        assert!(store.is_empty().await);

        store.clear_faults().await;
        store.save(&raw).await.unwrap();
        assert!(store.contains(raw.message_id()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_latency_delays_ack() {
        let store = InMemoryMessageStoreV2::new();
        store.set_save_latency(Duration::from_secs(5)).await;
        let raw = raw_message("x");

        let start = tokio::time::Instant::now();
        store.save(&raw).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
