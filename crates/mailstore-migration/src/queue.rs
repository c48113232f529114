//! Bounded queue shared by read-through callers and background workers.
//!
//! Inserts never wait: a full queue rejects the task. Workers wait on the
//! receive side until a task arrives or the queue is closed. Closing does not
//! drain; queued tasks are abandoned with the queue.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};

use mailstore_core::{AttachmentRef, MessageId, MessageWithoutAttachment, RawMessage};

/// A record scheduled for background migration.
///
/// Attachment references are materialized because the legacy lookup hands
/// them out as a single-use stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTask {
    pub message: MessageWithoutAttachment,
    pub attachments: Vec<AttachmentRef>,
}

impl MigrationTask {
    pub fn new(message: MessageWithoutAttachment, attachments: Vec<AttachmentRef>) -> Self {
        Self {
            message,
            attachments,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message.message_id()
    }

    pub fn into_raw(self) -> RawMessage {
        RawMessage::new(self.message, self.attachments)
    }
}

/// Result of offering a task to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Accepted for background migration.
    Enqueued,
    /// Rejected because the queue was at capacity.
    QueueFull,
    /// On-the-fly migration is turned off.
    Disabled,
    /// The queue was closed by a stop request.
    Closed,
    /// The record was served from V2; nothing to schedule.
    AlreadyMigrated,
}

impl EnqueueOutcome {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, EnqueueOutcome::Enqueued)
    }
}

/// Cloneable handle to the shared bounded queue and its stop flag.
#[derive(Clone)]
pub struct MigrationQueue {
    tx: mpsc::Sender<MigrationTask>,
    rx: Arc<Mutex<mpsc::Receiver<MigrationTask>>>,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl MigrationQueue {
    /// Create a queue holding at most `capacity` tasks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let (stop_tx, _) = watch::channel(false);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// Try to insert without waiting.
    pub fn offer(&self, task: MigrationTask) -> EnqueueOutcome {
        if self.is_closed() {
            return EnqueueOutcome::Closed;
        }
        match self.tx.try_send(task) {
            Ok(()) => EnqueueOutcome::Enqueued,
            Err(TrySendError::Full(_)) => EnqueueOutcome::QueueFull,
            Err(TrySendError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }

    /// Signal every worker to stop at its next wait point. Idempotent.
    pub fn close(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Tasks currently waiting.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub(crate) fn receiver(&self) -> Arc<Mutex<mpsc::Receiver<MigrationTask>>> {
        self.rx.clone()
    }

    pub(crate) fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_tx.subscribe()
    }
}

/// Resolves once the stop flag is raised or its sender is gone.
pub(crate) async fn stopped(stop_rx: &mut watch::Receiver<bool>) {
    loop {
        if *stop_rx.borrow_and_update() {
            return;
        }
        if stop_rx.changed().await.is_err() {
            return;
        }
    }
}
