//! Read-through fallback from V2 to V1 with opportunistic migration.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use mailstore_core::logging::{COMPONENT_READ_THROUGH, SUBSYSTEM_MIGRATION};
use mailstore_core::{
    AttachmentRef, Error, FetchType, Limit, MessageResult, MessageStoreV1,
    MessageWithoutAttachment, RawMessage, Result,
};

use crate::events::MigrationEvent;
use crate::queue::{EnqueueOutcome, MigrationQueue, MigrationTask};

/// A message served to a reader, whichever store it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    pub message: MessageWithoutAttachment,
    /// Attachment references; may be iterated any number of times.
    pub attachments: Vec<AttachmentRef>,
    /// What happened to the background migration request.
    pub scheduled: EnqueueOutcome,
}

impl ResolvedMessage {
    pub fn attachments(&self) -> impl Iterator<Item = &AttachmentRef> {
        self.attachments.iter()
    }

    pub fn into_raw(self) -> RawMessage {
        RawMessage::new(self.message, self.attachments)
    }
}

/// Serves V2 misses from V1 and offers the record to the migration queue.
///
/// The gate never waits on the queue: a full queue means the record is not
/// scheduled, and the read proceeds unchanged.
pub struct ReadThroughGate {
    v1: Arc<dyn MessageStoreV1>,
    queue: Option<MigrationQueue>,
    event_tx: broadcast::Sender<MigrationEvent>,
    // Serializes queue-full reporting and counts dropped tasks.
    dropped: Mutex<u64>,
}

impl ReadThroughGate {
    /// Create a gate. Without a queue, on-the-fly migration is disabled.
    pub fn new(
        v1: Arc<dyn MessageStoreV1>,
        queue: Option<MigrationQueue>,
        event_tx: broadcast::Sender<MigrationEvent>,
    ) -> Self {
        Self {
            v1,
            queue,
            event_tx,
            dropped: Mutex::new(0),
        }
    }

    pub fn on_the_fly_enabled(&self) -> bool {
        self.queue.is_some()
    }

    /// Tasks dropped so far because the queue was full.
    pub fn dropped_count(&self) -> u64 {
        *self.dropped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Turn a V2 lookup into the message a reader gets.
    ///
    /// A V2 hit is returned as-is. A miss is fetched from V1 and, when
    /// on-the-fly migration is enabled, offered to the queue. A miss that V1
    /// cannot resolve either is an invariant violation and fails with
    /// [`Error::RecordMissing`].
    #[instrument(
        skip(self, lookup),
        fields(
            subsystem = SUBSYSTEM_MIGRATION,
            component = COMPONENT_READ_THROUGH,
            message_id = %lookup.metadata().message_id
        )
    )]
    pub async fn resolve(&self, lookup: MessageResult) -> Result<ResolvedMessage> {
        let metadata = match lookup {
            MessageResult::Found(raw) => {
                return Ok(ResolvedMessage {
                    message: raw.message,
                    attachments: raw.attachments,
                    scheduled: EnqueueOutcome::AlreadyMigrated,
                })
            }
            MessageResult::NotFound(metadata) => metadata,
        };

        let (message, attachments) = self
            .v1
            .retrieve_messages(&[metadata], FetchType::Full, Limit::unlimited())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                error!(
                    mailbox_id = %metadata.mailbox_id,
                    uid = metadata.uid,
                    "Message missing from both V2 and V1"
                );
                Error::RecordMissing(metadata)
            })?;

        // The legacy stream can only be consumed once.
        let attachments: Vec<AttachmentRef> = attachments.collect();

        let scheduled = match &self.queue {
            Some(queue) => {
                let task = MigrationTask::new(message.clone(), attachments.clone());
                self.submit(queue, task)
            }
            None => EnqueueOutcome::Disabled,
        };

        Ok(ResolvedMessage {
            message,
            attachments,
            scheduled,
        })
    }

    fn submit(&self, queue: &MigrationQueue, task: MigrationTask) -> EnqueueOutcome {
        let message_id = task.message_id();
        let outcome = queue.offer(task);
        match outcome {
            EnqueueOutcome::Enqueued => {
                debug!("Message queued for migration");
                let _ = self.event_tx.send(MigrationEvent::Enqueued { message_id });
            }
            EnqueueOutcome::QueueFull => {
                let mut dropped = self.dropped.lock().unwrap_or_else(PoisonError::into_inner);
                *dropped += 1;
                info!(dropped = *dropped, "Migration queue is full, message is ignored");
                let _ = self.event_tx.send(MigrationEvent::Dropped { message_id });
            }
            EnqueueOutcome::Closed => {
                debug!("Migration queue closed, message not scheduled");
            }
            EnqueueOutcome::Disabled | EnqueueOutcome::AlreadyMigrated => {}
        }
        outcome
    }
}
