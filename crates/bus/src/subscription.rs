// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Subscriber-facing handle returned by [`crate::EventBus::subscribe`].

use crate::EventBus;
use amelia_core::{Event, WorkflowId};
use tokio::sync::mpsc;

/// Which events a subscriber wants to see (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionFilter {
    /// Every event for one workflow, e.g. the WebSocket broadcaster for a
    /// single connection scoped to `workflow_id`.
    Workflow(WorkflowId),
    /// Every event across all workflows, e.g. an internal tracer or a
    /// dashboard-wide WebSocket connection.
    All,
}

impl SubscriptionFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::Workflow(id) => event.workflow_id == *id,
            Self::All => true,
        }
    }
}

/// A live subscription to the bus. Dropping it unsubscribes, which is the
/// only way a subscriber is ever removed short of the slow-consumer policy
/// disconnecting it first (spec §4.2).
pub struct Subscription {
    id: u64,
    bus: EventBus,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    pub(crate) fn new(id: u64, bus: EventBus, rx: mpsc::Receiver<Event>) -> Self {
        Self { id, bus, rx }
    }

    /// Await the next event in strictly ascending `sequence` order for
    /// whatever this subscription's filter matches (spec §4.2 "Ordering").
    /// Returns `None` once the bus has dropped this subscriber, either via
    /// explicit unsubscribe or the slow-consumer disconnect policy.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
