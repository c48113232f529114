//! # mailstore-memory
//!
//! In-process store adapters for mailstore.
//!
//! This crate provides:
//! - A legacy (V1) message store with id-ordered batch reads
//! - A current (V2) message store with upsert writes
//! - An attachment store implementing the attachment loader
//! - A mailbox registry
//! - Fault injection hooks (failing writes, failing deletes, write latency)
//!
//! ## Example
//!
//! ```rust,ignore
//! use mailstore_memory::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//! backend.v2.fail_save_for(message_id).await;
//! ```

pub mod attachments;
pub mod fixtures;
pub mod mailboxes;
pub mod store_v1;
pub mod store_v2;

pub use attachments::InMemoryAttachmentStore;
pub use mailboxes::InMemoryMailboxManager;
pub use store_v1::InMemoryMessageStoreV1;
pub use store_v2::InMemoryMessageStoreV2;

/// All in-memory stores of one deployment. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    /// Legacy message store.
    pub v1: InMemoryMessageStoreV1,
    /// Current message store.
    pub v2: InMemoryMessageStoreV2,
    /// Attachment bodies.
    pub attachments: InMemoryAttachmentStore,
    /// Mailbox registry.
    pub mailboxes: InMemoryMailboxManager,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}
