//! Structured logging conventions for mailstore.
//!
//! Every migration log event carries `subsystem` and `component` fields whose
//! values are the constants below, so log aggregation can filter by them.
//! Per-record events use these field names:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `message_id` | Message being read or migrated |
//! | `mailbox_id` | Mailbox containing the message |
//! | `worker` | Background worker index |
//! | `batch_size` | Records per sweep page |
//! | `migrated` / `failed` / `pages` | Sweep counters |
//! | `duration_ms` | Wall-clock duration in milliseconds |
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Invariant violation, requires operator attention |
//! | WARN  | Per-record failure, record left for a later attempt |
//! | INFO  | Lifecycle events (pool start/stop, sweep start/finish), dropped tasks |
//! | DEBUG | Per-record success, queue decisions |
//! | TRACE | Page iteration |

// ─── Subsystems ────────────────────────────────────────────────────────────

/// V1 to V2 migration engine.
pub const SUBSYSTEM_MIGRATION: &str = "migration";

/// Store adapters.
pub const SUBSYSTEM_STORE: &str = "store";

// ─── Components ────────────────────────────────────────────────────────────

pub const COMPONENT_COORDINATOR: &str = "coordinator";

pub const COMPONENT_WORKER_POOL: &str = "worker_pool";

pub const COMPONENT_READ_THROUGH: &str = "read_through";

pub const COMPONENT_SWEEP: &str = "sweep";

pub const COMPONENT_MEMORY_STORE: &str = "memory_store";
