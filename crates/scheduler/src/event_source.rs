// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Adapts [`amelia_storage::Store`] to [`amelia_bus::EventSource`].
//!
//! Neither the trait nor `Store` lives in this crate, so the orphan rule
//! forbids `impl EventSource for Store` anywhere but `amelia-storage` or
//! `amelia-bus` — and adding either crate as a dependency of the other just
//! to allow that impl would invert the layering spec.md §2 describes
//! (storage has no business knowing about pub/sub). A local newtype that
//! wraps the store and implements the foreign trait is the standard way
//! around this, the same shape the teacher reaches for when bridging two
//! independently-owned traits (`oj-daemon`'s adapter wrappers around
//! `oj-adapters` traits).

use amelia_core::{AmeliaError, WorkflowId};
use amelia_bus::EventSource;
use amelia_storage::{EventRepository, Store};
use std::sync::Arc;

/// Thin wrapper making a [`Store`] usable as an [`EventSource`] for replay on
/// subscribe (spec §4.2).
#[derive(Clone)]
pub struct StoreEventSource(Arc<Store>);

impl StoreEventSource {
    pub fn new(store: Arc<Store>) -> Self {
        Self(store)
    }
}

impl EventSource for StoreEventSource {
    fn events_since(
        &self,
        workflow_id: WorkflowId,
        since_sequence: u64,
    ) -> Result<Vec<amelia_core::Event>, AmeliaError> {
        self.0.list(workflow_id, Some(since_sequence), None)
    }
}

#[cfg(test)]
#[path = "event_source_tests.rs"]
mod tests;
