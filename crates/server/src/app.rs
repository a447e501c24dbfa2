// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The `App` aggregate (spec §9 "Module-level/global state" — re-expressed
//! as an explicit struct constructed once at startup and threaded through
//! axum's `State` extractor, never a package-level `static`/`lazy_static`).
//!
//! Owns the durable [`Store`], the [`EventBus`], and the
//! [`Scheduler`] every HTTP handler and the WebSocket broadcaster read
//! from.

use crate::config::Config;
use amelia_bus::EventBus;
use amelia_core::SystemClock;
use amelia_driver::{DefaultDriverFactory, DriverFactory};
use amelia_scheduler::{Scheduler, SchedulerError, StoreEventSource};
use amelia_storage::{bootstrap, RecoveryReport, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct App {
    pub store: Arc<Store>,
    pub bus: EventBus,
    pub scheduler: Arc<Scheduler<SystemClock>>,
    pub config: Arc<Config>,
}

impl App {
    /// Opens the store (WAL replay per spec §4.1/§4.4), wires the bus, and
    /// resumes any workflow a prior process left in flight (spec §4.4
    /// "Checkpointed restart") before returning. The caller starts accepting
    /// HTTP/WebSocket traffic only after this resolves, mirroring the
    /// teacher's `startup()` → bind-listener-last ordering.
    pub async fn bootstrap(config: Config) -> Result<(Self, RecoveryReport), SchedulerError> {
        let (store, report) = bootstrap::open_store(&config.database_path)?;
        let store = Arc::new(store);

        tracing::info!(
            loaded_snapshot = report.loaded_snapshot,
            snapshot_seq = report.snapshot_seq,
            replayed_entries = report.replayed_entries,
            "store recovered"
        );

        let bus = EventBus::new(Arc::new(StoreEventSource::new(Arc::clone(&store))));
        let driver_factory: Arc<dyn DriverFactory> = Arc::new(DefaultDriverFactory::new(config.driver.clone()));
        let scheduler =
            Arc::new(Scheduler::new(Arc::clone(&store), bus.clone(), driver_factory, SystemClock)?);

        scheduler.resume_from_checkpoint().await?;

        Ok((Self { store, bus, scheduler, config: Arc::new(config) }, report))
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
