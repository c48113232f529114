//! Migration engine configuration.

use serde::{Deserialize, Serialize};

use mailstore_core::defaults::{
    MIGRATION_BATCH_SIZE, MIGRATION_ON_THE_FLY, MIGRATION_QUEUE_CAPACITY, MIGRATION_WORKER_COUNT,
};
use mailstore_core::{Error, Result};

/// Configuration for the V1 to V2 migration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Whether read misses schedule background migration.
    pub on_the_fly_enabled: bool,
    /// Number of background workers draining the queue.
    pub worker_count: usize,
    /// Capacity of the shared migration queue.
    pub queue_capacity: usize,
    /// Records read per sweep page.
    pub batch_size: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            on_the_fly_enabled: MIGRATION_ON_THE_FLY,
            worker_count: MIGRATION_WORKER_COUNT,
            queue_capacity: MIGRATION_QUEUE_CAPACITY,
            batch_size: MIGRATION_BATCH_SIZE,
        }
    }
}

impl MigrationConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `V1_TO_V2_ON_THE_FLY` | `false` | Migrate records in the background when read |
    /// | `V1_TO_V2_THREAD_COUNT` | `2` | Background migration workers |
    /// | `V1_TO_V2_QUEUE_LENGTH` | `1000` | Migration queue capacity |
    /// | `V1_TO_V2_BATCH_SIZE` | `100` | Records per sweep page |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let positive = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(default)
                .max(1)
        };

        let on_the_fly_enabled = lookup("V1_TO_V2_ON_THE_FLY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(MIGRATION_ON_THE_FLY);

        Self {
            on_the_fly_enabled,
            worker_count: positive("V1_TO_V2_THREAD_COUNT", MIGRATION_WORKER_COUNT),
            queue_capacity: positive("V1_TO_V2_QUEUE_LENGTH", MIGRATION_QUEUE_CAPACITY),
            batch_size: positive("V1_TO_V2_BATCH_SIZE", MIGRATION_BATCH_SIZE),
        }
    }

    /// Enable or disable on-the-fly migration.
    pub fn with_on_the_fly(mut self, enabled: bool) -> Self {
        self.on_the_fly_enabled = enabled;
        self
    }

    /// Set the number of background workers.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the sweep page size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Reject zero-valued sizes.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::Config("worker_count must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}
