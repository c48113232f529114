//! Events broadcast by the migration engine.

use mailstore_core::{MessageId, MigrationResult};

/// Event emitted by the worker pool, the read-through gate or the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    /// A background worker started.
    WorkerStarted { worker: usize },
    /// A background worker exited.
    WorkerStopped { worker: usize },
    /// A read miss was scheduled for background migration.
    Enqueued { message_id: MessageId },
    /// A read miss was not scheduled because the queue was full.
    Dropped { message_id: MessageId },
    /// A record was written to V2 and removed from V1.
    Migrated { message_id: MessageId },
    /// A record failed to migrate.
    Failed {
        message_id: MessageId,
        error: String,
        /// The write succeeded but the delete did not.
        transient_duplicate: bool,
    },
    /// A batch sweep reached its terminal status.
    SweepFinished {
        result: MigrationResult,
        migrated: u64,
        failed: u64,
    },
}
