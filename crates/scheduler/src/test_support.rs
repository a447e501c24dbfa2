// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Shared fixtures for this crate's own tests: a disposable on-disk store
//! and the bus wired to it, so every `_tests.rs` side-module doesn't
//! reimplement WAL setup.

use crate::event_source::StoreEventSource;
use amelia_bus::EventBus;
use amelia_storage::{MaterializedState, Store, Wal};
use parking_lot::Mutex;
use std::sync::Arc;

pub fn test_store(dir: &std::path::Path) -> Arc<Store> {
    let wal = Wal::open(&dir.join("wal.log"), 0).expect("open wal");
    Arc::new(Store::new(Arc::new(Mutex::new(MaterializedState::default())), Arc::new(Mutex::new(wal))))
}

pub fn test_bus(store: Arc<Store>) -> EventBus {
    EventBus::new(Arc::new(StoreEventSource::new(store)))
}
