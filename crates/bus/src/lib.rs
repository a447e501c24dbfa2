// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Process-local event pub/sub with bounded per-subscriber queues and replay.
//!
//! `emit` never blocks the caller: events are fanned out with `try_send`, and
//! a subscriber whose queue is full is disconnected rather than allowed to
//! slow down the producer. Subscribing with `since_sequence` first drains
//! matching history from an [`EventSource`] (the durable store) before the
//! subscription starts receiving live events, the way the teacher's
//! `Executor` hands every agent a fresh `mpsc::Sender<Event>` and fans out
//! from there — this crate generalizes that single-consumer channel into a
//! registry of many.

mod subscription;

pub use subscription::{Subscription, SubscriptionFilter};

use amelia_core::{AmeliaError, Event, WorkflowId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default bound on a subscriber's queue (spec §4.2).
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Supplies history for replay on subscribe. Implemented by the durable
/// store; kept as a narrow trait here so this crate doesn't need to depend
/// on the storage crate's full API.
pub trait EventSource: Send + Sync {
    fn events_since(
        &self,
        workflow_id: WorkflowId,
        since_sequence: u64,
    ) -> Result<Vec<Event>, AmeliaError>;
}

struct Subscriber {
    filter: SubscriptionFilter,
    tx: mpsc::Sender<Event>,
}

struct Inner {
    source: Arc<dyn EventSource>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

/// The bus. Cheaply `Clone`able; every clone shares the same subscriber
/// registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self::with_queue_capacity(source, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(source: Arc<dyn EventSource>, queue_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                queue_capacity,
            }),
        }
    }

    /// Subscribe to events matching `filter`.
    ///
    /// `since_sequence` triggers replay, but only for [`SubscriptionFilter::Workflow`]
    /// — a workflow's sequence numbers are only meaningful within that
    /// workflow, so `SubscriptionFilter::All` subscriptions start from the
    /// live tail regardless of `since_sequence`.
    pub fn subscribe(
        &self,
        filter: SubscriptionFilter,
        since_sequence: Option<u64>,
    ) -> Subscription {
        let (tx, rx) = mpsc::channel(self.inner.queue_capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        // Registration and backlog replay happen under the same registry
        // lock `emit` takes, so a concurrent emit is either already visible
        // to `events_since` (it persisted before we queried — we'll replay
        // it, and the emit call blocked on this lock will then duplicate it
        // live, which the caller dedups by sequence) or not yet persisted
        // (the emit call is still blocked on this lock — it'll deliver live
        // once we release it). Either way the event is never lost, only
        // possibly duplicated, matching the replay protocol (spec §4.2).
        let mut subs = self.inner.subscribers.lock();
        subs.insert(id, Subscriber { filter, tx: tx.clone() });

        if let (SubscriptionFilter::Workflow(workflow_id), Some(since)) = (&filter, since_sequence)
        {
            match self.inner.source.events_since(*workflow_id, since) {
                Ok(backlog) => {
                    for event in backlog {
                        if tx.try_send(event).is_err() {
                            tracing::warn!(
                                workflow_id = %workflow_id,
                                "replay backlog exceeded subscriber queue capacity, truncating"
                            );
                            break;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(workflow_id = %workflow_id, error = %err, "replay failed");
                }
            }
        }
        drop(subs);

        Subscription::new(id, self.clone(), rx)
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        self.inner.subscribers.lock().remove(&id);
    }

    /// Fan an already-persisted event out to matching subscribers.
    ///
    /// Never blocks: a subscriber whose queue is full is dropped rather than
    /// allowed to apply backpressure to the producer (spec §4.2, §5).
    pub fn emit(&self, event: Event) {
        let mut subs = self.inner.subscribers.lock();
        let mut dead = Vec::new();
        for (id, sub) in subs.iter() {
            if !sub.filter.matches(&event) {
                continue;
            }
            if sub.tx.try_send(event.clone()).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            tracing::debug!(subscriber_id = id, "dropping slow subscriber");
            subs.remove(&id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
