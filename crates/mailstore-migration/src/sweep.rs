//! Offline sweep migrating every remaining V1 record.

use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace, warn};

use mailstore_core::logging::{COMPONENT_SWEEP, SUBSYSTEM_MIGRATION};
use mailstore_core::{Migration, MigrationResult, RawMessage};

use crate::events::MigrationEvent;
use crate::migrate::MigrationStores;

/// Counters of a finished sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub result: MigrationResult,
    pub migrated: u64,
    pub failed: u64,
    pub pages: u64,
}

impl SweepReport {
    fn record(&mut self, outcome: MigrationResult) {
        match outcome {
            MigrationResult::Completed => self.migrated += 1,
            MigrationResult::Partial => self.failed += 1,
        }
        self.result = self.result.combine(outcome);
    }
}

/// Pages through V1 and migrates each record synchronously.
///
/// A failure on one record is logged and counted; it never stops the page or
/// the sweep. Records that fail stay in V1 and are picked up by the next run.
pub struct BatchSweepRunner {
    stores: MigrationStores,
    batch_size: usize,
    event_tx: broadcast::Sender<MigrationEvent>,
}

impl BatchSweepRunner {
    pub fn new(
        stores: MigrationStores,
        batch_size: usize,
        event_tx: broadcast::Sender<MigrationEvent>,
    ) -> Self {
        Self {
            stores,
            batch_size: batch_size.max(1),
            event_tx,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run the sweep to exhaustion and return its counters.
    ///
    /// Pages are read after the last id of the previous page, so a record
    /// that failed is not read again within the same run. A failed page read
    /// ends the sweep as `Partial`.
    #[instrument(
        skip(self),
        fields(
            subsystem = SUBSYSTEM_MIGRATION,
            component = COMPONENT_SWEEP,
            batch_size = self.batch_size
        )
    )]
    pub async fn sweep(&self) -> SweepReport {
        let start = Instant::now();
        let mut report = SweepReport::default();
        let mut cursor = None;

        info!("V1 to V2 sweep started");

        loop {
            let page = match self.stores.v1.read_batch(cursor, self.batch_size).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        error = %e,
                        pages = report.pages,
                        "Failed to read V1 batch, sweep stopped"
                    );
                    report.result = MigrationResult::Partial;
                    break;
                }
            };
            if page.is_empty() {
                break;
            }

            report.pages += 1;
            trace!(page = report.pages, records = page.len(), "Migrating V1 page");
            cursor = page.last().map(RawMessage::message_id);

            for raw in &page {
                report.record(self.migrate(raw).await);
            }
        }

        info!(
            result = %report.result,
            migrated = report.migrated,
            failed = report.failed,
            pages = report.pages,
            duration_ms = start.elapsed().as_millis() as u64,
            "V1 to V2 sweep finished"
        );
        let _ = self.event_tx.send(MigrationEvent::SweepFinished {
            result: report.result,
            migrated: report.migrated,
            failed: report.failed,
        });

        report
    }

    async fn migrate(&self, raw: &RawMessage) -> MigrationResult {
        let message_id = raw.message_id();
        match self.stores.copy_then_delete(raw).await {
            Ok(()) => {
                debug!(%message_id, "Message migrated");
                let _ = self.event_tx.send(MigrationEvent::Migrated { message_id });
                MigrationResult::Completed
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
                MigrationResult::Partial
            }
        }
    }
}

#[async_trait]
impl Migration for BatchSweepRunner {
    async fn run(&self) -> MigrationResult {
        self.sweep().await.result
    }
}
