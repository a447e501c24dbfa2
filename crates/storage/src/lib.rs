// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Durable storage: a write-ahead log of operations, a materialized state
//! derived by replaying them, and periodic compressed snapshots so recovery
//! doesn't replay the log from the beginning of time (spec §4.1, §4.4).

pub mod bootstrap;
pub mod checkpoint;
pub mod error;
pub mod migration;
pub mod op;
pub mod repository;
pub mod snapshot;
pub mod state;
pub mod wal;

pub use bootstrap::{open_store, RecoveryReport, SNAPSHOT_FILE_NAME, WAL_FILE_NAME};
pub use checkpoint::{load_snapshot, CheckpointResult, Checkpointer};
pub use error::StorageError;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use op::WalOp;
pub use repository::{
    EventRepository, ProfileRepository, SettingsPatch, SettingsRepository, Store,
    TaskPlanRepository, TokenUsageRepository, WorkflowFilter, WorkflowRepository,
};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};
