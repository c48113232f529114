//! Background workers draining the migration queue.

use std::sync::Mutex;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use mailstore_core::logging::{COMPONENT_WORKER_POOL, SUBSYSTEM_MIGRATION};

use crate::events::MigrationEvent;
use crate::migrate::MigrationStores;
use crate::queue::{stopped, MigrationQueue, MigrationTask};

/// Fixed set of workers sharing one [`MigrationQueue`].
///
/// Each worker waits for a task, migrates it with copy-then-delete, logs the
/// outcome and goes back to waiting. Failures are never retried or requeued.
pub struct MigrationWorkerPool {
    queue: MigrationQueue,
    handles: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl MigrationWorkerPool {
    /// Spawn `worker_count` workers on the current tokio runtime.
    pub fn start(
        worker_count: usize,
        queue: MigrationQueue,
        stores: MigrationStores,
        event_tx: broadcast::Sender<MigrationEvent>,
    ) -> Self {
        let handles = (0..worker_count)
            .map(|worker| {
                let worker_ref = MigrationWorker {
                    worker,
                    queue: queue.clone(),
                    stores: stores.clone(),
                    event_tx: event_tx.clone(),
                };
                tokio::spawn(worker_ref.run())
            })
            .collect();

        info!(
            subsystem = SUBSYSTEM_MIGRATION,
            component = COMPONENT_WORKER_POOL,
            worker_count,
            queue_capacity = queue.capacity(),
            "Migration worker pool started"
        );

        Self {
            queue,
            handles: Mutex::new(handles),
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Signal every worker to exit at its next wait point. Queued tasks are
    /// abandoned.
    pub fn stop(&self) {
        if !self.queue.is_closed() {
            info!(
                subsystem = SUBSYSTEM_MIGRATION,
                component = COMPONENT_WORKER_POOL,
                abandoned = self.queue.len(),
                "Stopping migration worker pool"
            );
        }
        self.queue.close();
    }

    /// Stop and wait for every worker to exit.
    pub async fn stop_and_wait(&self) {
        self.stop();
        let handles: Vec<JoinHandle<()>> = {
            let mut handles = self
                .handles
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            handles.drain(..).collect()
        };
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(
                    subsystem = SUBSYSTEM_MIGRATION,
                    component = COMPONENT_WORKER_POOL,
                    error = ?e,
                    "Migration worker panicked"
                );
            }
        }
    }
}

impl Drop for MigrationWorkerPool {
    fn drop(&mut self) {
        self.queue.close();
    }
}

/// Reference bundle owned by one spawned worker.
struct MigrationWorker {
    worker: usize,
    queue: MigrationQueue,
    stores: MigrationStores,
    event_tx: broadcast::Sender<MigrationEvent>,
}

impl MigrationWorker {
    #[instrument(
        skip(self),
        fields(
            subsystem = SUBSYSTEM_MIGRATION,
            component = COMPONENT_WORKER_POOL,
            worker = self.worker
        )
    )]
    async fn run(self) {
        let mut stop_rx = self.queue.subscribe_stop();
        let receiver = self.queue.receiver();
        let _ = self.event_tx.send(MigrationEvent::WorkerStarted {
            worker: self.worker,
        });
        debug!("Migration worker started");

        loop {
            // Stop is only observed while waiting; a dequeued task always
            // finishes its write and delete.
            let task = {
                let mut rx = tokio::select! {
                    biased;
                    _ = stopped(&mut stop_rx) => break,
                    rx = receiver.lock() => rx,
                };
                tokio::select! {
                    biased;
                    _ = stopped(&mut stop_rx) => break,
                    task = rx.recv() => match task {
                        Some(task) => task,
                        None => break,
                    },
                }
            };
            self.process(task).await;
        }

        let _ = self.event_tx.send(MigrationEvent::WorkerStopped {
            worker: self.worker,
        });
        debug!("Migration worker stopped");
    }

    async fn process(&self, task: MigrationTask) {
        let start = Instant::now();
        let message_id = task.message_id();

        match self.stores.migrate_task(task).await {
            Ok(()) => {
                debug!(
                    %message_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Message migrated"
                );
                let _ = self.event_tx.send(MigrationEvent::Migrated { message_id });
            }
            Err(e) => {
                warn!(
                    %message_id,
                    error = %e,
                    transient_duplicate = e.is_transient_duplicate(),
                    "Error while migrating message"
                );
                let _ = self.event_tx.send(MigrationEvent::Failed {
                    message_id,
                    error: e.to_string(),
                    transient_duplicate: e.is_transient_duplicate(),
                });
            }
        }
    }
}
