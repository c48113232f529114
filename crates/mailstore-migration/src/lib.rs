//! # mailstore-migration
//!
//! Moves message records from the legacy (V1) store to the current (V2)
//! store while the system keeps serving reads.
//!
//! This crate provides:
//! - Read-through fallback: V2 misses are served from V1
//! - On-the-fly migration of read misses through a bounded queue and a
//!   fixed pool of background workers
//! - An offline batch sweep over every remaining V1 record
//! - Copy-then-delete semantics: a record is removed from V1 only after its
//!   V2 write succeeded
//! - Migration events via broadcast channels
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailstore_migration::{MigrationConfig, MigrationCoordinator, MigrationStores};
//!
//! let stores = MigrationStores::new(v1, v2, attachments);
//! let coordinator = MigrationCoordinator::new(stores, MigrationConfig::from_env())?;
//!
//! // Serve a read; a miss is scheduled for background migration
//! let message = coordinator.read(&metadata).await?;
//!
//! // Migrate whatever is left
//! let result = coordinator.run_batch_sweep().await;
//! println!("Sweep finished: {}", result);
//!
//! // Graceful shutdown
//! coordinator.stop_and_wait().await;
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod gate;
pub mod migrate;
pub mod queue;
pub mod sweep;
pub mod worker;

// Re-export core types
pub use mailstore_core::*;

pub use config::MigrationConfig;
pub use coordinator::MigrationCoordinator;
pub use error::MigrationError;
pub use events::MigrationEvent;
pub use gate::{ReadThroughGate, ResolvedMessage};
pub use migrate::MigrationStores;
pub use queue::{EnqueueOutcome, MigrationQueue, MigrationTask};
pub use sweep::{BatchSweepRunner, SweepReport};
pub use worker::MigrationWorkerPool;
