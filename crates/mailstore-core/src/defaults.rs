//! Centralized default constants for mailstore.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// V1 TO V2 MIGRATION
// =============================================================================

/// On-the-fly migration is opt-in.
pub const MIGRATION_ON_THE_FLY: bool = false;

/// Number of background migration workers.
pub const MIGRATION_WORKER_COUNT: usize = 2;

/// Capacity of the on-the-fly migration queue. Reads that miss while the queue
/// is full are served but not scheduled.
pub const MIGRATION_QUEUE_CAPACITY: usize = 1000;

/// Number of legacy records read per sweep page.
pub const MIGRATION_BATCH_SIZE: usize = 100;

// =============================================================================
// EVENTS
// =============================================================================

/// Capacity of the migration event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// MAILBOXES
// =============================================================================

/// Maximum mailbox name length in bytes.
pub const MAILBOX_NAME_MAX_LEN: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_defaults_are_positive() {
        assert!(MIGRATION_WORKER_COUNT > 0);
        assert!(MIGRATION_QUEUE_CAPACITY > 0);
        assert!(MIGRATION_BATCH_SIZE > 0);
        assert!(EVENT_BUS_CAPACITY > 0);
    }
}
