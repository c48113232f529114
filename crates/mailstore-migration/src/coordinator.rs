//! Wiring of the queue, the worker pool, the read-through gate and the sweep.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use mailstore_core::defaults::EVENT_BUS_CAPACITY;
use mailstore_core::logging::{COMPONENT_COORDINATOR, SUBSYSTEM_MIGRATION};
use mailstore_core::{MessageMetadata, MessageResult, Migration, MigrationResult, Result};

use crate::config::MigrationConfig;
use crate::events::MigrationEvent;
use crate::gate::{ReadThroughGate, ResolvedMessage};
use crate::migrate::MigrationStores;
use crate::queue::MigrationQueue;
use crate::sweep::{BatchSweepRunner, SweepReport};
use crate::worker::MigrationWorkerPool;

/// Entry point of the migration engine.
///
/// When on-the-fly migration is enabled, construction starts the worker pool
/// and must happen inside a tokio runtime. Dropping the coordinator stops the
/// workers without waiting for them.
pub struct MigrationCoordinator {
    config: MigrationConfig,
    stores: MigrationStores,
    queue: Option<MigrationQueue>,
    pool: Option<MigrationWorkerPool>,
    gate: ReadThroughGate,
    sweep: BatchSweepRunner,
    event_tx: broadcast::Sender<MigrationEvent>,
}

impl MigrationCoordinator {
    pub fn new(stores: MigrationStores, config: MigrationConfig) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);

        let (queue, pool) = if config.on_the_fly_enabled {
            let queue = MigrationQueue::new(config.queue_capacity);
            let pool = MigrationWorkerPool::start(
                config.worker_count,
                queue.clone(),
                stores.clone(),
                event_tx.clone(),
            );
            (Some(queue), Some(pool))
        } else {
            (None, None)
        };

        let gate = ReadThroughGate::new(stores.v1.clone(), queue.clone(), event_tx.clone());
        let sweep = BatchSweepRunner::new(stores.clone(), config.batch_size, event_tx.clone());

        info!(
            subsystem = SUBSYSTEM_MIGRATION,
            component = COMPONENT_COORDINATOR,
            on_the_fly = config.on_the_fly_enabled,
            worker_count = config.worker_count,
            queue_capacity = config.queue_capacity,
            batch_size = config.batch_size,
            "Migration coordinator initialized"
        );

        Ok(Self {
            config,
            stores,
            queue,
            pool,
            gate,
            sweep,
            event_tx,
        })
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn gate(&self) -> &ReadThroughGate {
        &self.gate
    }

    /// Subscribe to migration events.
    pub fn events(&self) -> broadcast::Receiver<MigrationEvent> {
        self.event_tx.subscribe()
    }

    /// Tasks waiting in the queue; zero when on-the-fly migration is off.
    pub fn queue_len(&self) -> usize {
        self.queue.as_ref().map_or(0, MigrationQueue::len)
    }

    /// Read a message from V2, falling back to V1 on a miss.
    pub async fn read(&self, metadata: &MessageMetadata) -> Result<ResolvedMessage> {
        let lookup = self.stores.v2.retrieve(metadata).await?;
        self.gate.resolve(lookup).await
    }

    /// Resolve a V2 lookup the caller already performed.
    pub async fn resolve(&self, lookup: MessageResult) -> Result<ResolvedMessage> {
        self.gate.resolve(lookup).await
    }

    /// Migrate every remaining V1 record and return the terminal status.
    pub async fn run_batch_sweep(&self) -> MigrationResult {
        self.sweep.run().await
    }

    /// Same as [`run_batch_sweep`](Self::run_batch_sweep), returning the
    /// per-record counters as well.
    pub async fn sweep_report(&self) -> SweepReport {
        self.sweep.sweep().await
    }

    /// Ask the workers to stop. Returns immediately; safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(pool) = &self.pool {
            pool.stop();
        }
    }

    /// Stop the workers and wait until they have all exited.
    pub async fn stop_and_wait(&self) {
        if let Some(pool) = &self.pool {
            pool.stop_and_wait().await;
            info!(
                subsystem = SUBSYSTEM_MIGRATION,
                component = COMPONENT_COORDINATOR,
                "Migration workers stopped"
            );
        }
    }
}

#[async_trait]
impl Migration for MigrationCoordinator {
    async fn run(&self) -> MigrationResult {
        self.run_batch_sweep().await
    }
}

impl Drop for MigrationCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
