// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Append-only observable records (spec §3, §6).

use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an [`Event`] row.
    pub struct EventId("evt-");
}

/// Closed enum of event types (spec §6). `Brainstorm*` and `Document*`
/// variants are the auxiliary families the spec says the core does not
/// interpret — they round-trip through the wire but no orchestrator logic
/// ever matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    WorkflowCreated,
    WorkflowStarted,
    WorkflowCompleted,
    WorkflowFailed,
    WorkflowCancelled,
    StageStarted,
    StageCompleted,
    PlanCompleted,
    PlanUpdated,
    TaskStarted,
    TaskCompleted,
    TaskFailed,
    ReviewSubmitted,
    ApprovalRequested,
    ApprovalGranted,
    ApprovalRejected,
    AgentOutput,
    /// Auxiliary family: brainstorming chat. Opaque to the core.
    Brainstorm,
    /// Auxiliary family: document ingestion. Opaque to the core.
    DocumentIngestion,
}

impl EventType {
    /// The spec calls out that a terminal workflow status emits exactly one
    /// terminal event (spec §8); this is the set those statuses map to.
    pub fn is_workflow_terminal(self) -> bool {
        matches!(
            self,
            Self::WorkflowCompleted | Self::WorkflowFailed | Self::WorkflowCancelled
        )
    }
}

/// One row in a workflow's append-only event log (spec §3).
///
/// `sequence` is assigned by the store at append time (spec §4.1), never by
/// the caller — constructors here leave it at 0 as a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub workflow_id: WorkflowId,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub agent: Option<String>,
    pub event_type: EventType,
    pub message: String,
    pub tool_name: Option<String>,
    pub tool_input: Option<serde_json::Value>,
    pub is_error: bool,
    pub data: Option<serde_json::Value>,
}

impl Event {
    pub fn new(
        workflow_id: WorkflowId,
        event_type: EventType,
        message: impl Into<String>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            id: EventId::new(),
            workflow_id,
            sequence: 0,
            timestamp_ms,
            agent: None,
            event_type,
            message: message.into(),
            tool_name: None,
            tool_input: None,
            is_error: false,
            data: None,
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn as_error(mut self) -> Self {
        self.is_error = true;
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
