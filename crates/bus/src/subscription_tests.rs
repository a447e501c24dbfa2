// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use crate::EventBus;
use amelia_core::{test_support, AmeliaError, WorkflowId};

struct EmptySource;

impl crate::EventSource for EmptySource {
    fn events_since(
        &self,
        _workflow_id: WorkflowId,
        _since_sequence: u64,
    ) -> Result<Vec<Event>, AmeliaError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn recv_returns_none_once_bus_drops_subscriber() {
    let bus = EventBus::new(std::sync::Arc::new(EmptySource));
    let workflow = test_support::test_workflow("/tmp/w");
    let mut sub = bus.subscribe(SubscriptionFilter::Workflow(workflow.id), None);

    let event = Event::new(workflow.id, amelia_core::EventType::WorkflowCreated, "created", 1);
    bus.emit(event.clone());
    let received = sub.recv().await.expect("event should be delivered");
    assert_eq!(received.id, event.id);
}

#[tokio::test]
async fn filter_workflow_ignores_other_workflows() {
    assert!(!SubscriptionFilter::Workflow(WorkflowId::new()).matches(&Event::new(
        WorkflowId::new(),
        amelia_core::EventType::WorkflowCreated,
        "x",
        1
    )));
    assert!(SubscriptionFilter::All.matches(&Event::new(
        WorkflowId::new(),
        amelia_core::EventType::WorkflowCreated,
        "x",
        1
    )));
}
