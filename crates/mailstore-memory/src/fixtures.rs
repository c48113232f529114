//! Test fixtures for store and migration tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailstore_memory::fixtures::TestDataBuilder;
//! use mailstore_memory::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//! let seeded = TestDataBuilder::new(&backend)
//!     .with_messages(3)
//!     .with_attachment_message("Subject: report\r\n\r\nsee attached", "report.pdf")
//!     .build()
//!     .await;
//! ```

use mailstore_core::{MessageId, MessageMetadata, MessageWithoutAttachment, RawMessage};
use uuid::Uuid;

use crate::MemoryBackend;

/// Build a record with fresh metadata and no attachments.
pub fn raw_message(content: &str) -> RawMessage {
    RawMessage::new(
        MessageWithoutAttachment::from_content(metadata(), content.as_bytes().to_vec()),
        Vec::new(),
    )
}

/// Fresh metadata in a random mailbox.
pub fn metadata() -> MessageMetadata {
    MessageMetadata {
        message_id: MessageId::new(),
        mailbox_id: Uuid::new_v4(),
        uid: 1,
    }
}

enum Seed {
    Plain(String),
    WithAttachment { content: String, body: String },
}

/// Seeds the legacy store of a [`MemoryBackend`].
pub struct TestDataBuilder<'a> {
    backend: &'a MemoryBackend,
    seeds: Vec<Seed>,
}

impl<'a> TestDataBuilder<'a> {
    pub fn new(backend: &'a MemoryBackend) -> Self {
        Self {
            backend,
            seeds: Vec::new(),
        }
    }

    /// Add `count` plain messages.
    pub fn with_messages(mut self, count: usize) -> Self {
        for i in 0..count {
            self.seeds.push(Seed::Plain(format!(
                "Subject: message {}\r\nFrom: sender@example.com\r\n\r\nbody {}",
                i, i
            )));
        }
        self
    }

    pub fn with_message(mut self, content: impl Into<String>) -> Self {
        self.seeds.push(Seed::Plain(content.into()));
        self
    }

    /// Add a message with one attachment whose body lives in the attachment store.
    pub fn with_attachment_message(
        mut self,
        content: impl Into<String>,
        attachment_body: impl Into<String>,
    ) -> Self {
        self.seeds.push(Seed::WithAttachment {
            content: content.into(),
            body: attachment_body.into(),
        });
        self
    }

    /// Insert everything into V1 and return the records in insertion order.
    pub async fn build(self) -> Vec<RawMessage> {
        let mut inserted = Vec::with_capacity(self.seeds.len());
        for seed in self.seeds {
            let raw = match seed {
                Seed::Plain(content) => raw_message(&content),
                Seed::WithAttachment { content, body } => {
                    let reference = self
                        .backend
                        .attachments
                        .store("application/octet-stream", body.into_bytes())
                        .await;
                    let mut raw = raw_message(&content);
                    raw.attachments.push(reference);
                    raw
                }
            };
            self.backend.v1.insert(raw.clone()).await;
            inserted.push(raw);
        }
        inserted
    }
}
