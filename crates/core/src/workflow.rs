// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Workflow identifier and state machine (spec §3, §4.3).

use crate::clock::Clock;
use crate::profile::ProfileId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for one Architect → Developer → Reviewer attempt.
    pub struct WorkflowId("wfl-");
}

/// The stage a running workflow is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Architect,
    Developer,
    Reviewer,
}

crate::simple_display! {
    Stage {
        Architect => "architect",
        Developer => "developer",
        Reviewer => "reviewer",
    }
}

/// Workflow lifecycle status (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Planning,
    InProgress,
    Blocked,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    WorkflowStatus {
        Pending => "pending",
        Planning => "planning",
        InProgress => "in_progress",
        Blocked => "blocked",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl WorkflowStatus {
    /// Terminal statuses have no outgoing edges (spec §3 invariant 5).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// A worktree slot is held while status is `in_progress` or `blocked`
    /// (spec §3 invariant 1).
    pub fn holds_worktree_slot(self) -> bool {
        matches!(self, Self::InProgress | Self::Blocked)
    }
}

/// A transition attempted outside the graph in spec §4.3.
#[derive(Debug, Error)]
#[error("invalid transition {from} -> {to}")]
pub struct WorkflowTransitionError {
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
}

/// One end-to-end attempt to implement an issue (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub issue_id: String,
    pub worktree_path: PathBuf,
    pub worktree_name: String,
    pub profile_id: ProfileId,
    pub status: WorkflowStatus,
    pub current_stage: Option<Stage>,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub planned_at_ms: Option<u64>,
    pub failure_reason: Option<String>,
    pub external_plan: bool,
    pub plan_path: Option<PathBuf>,
}

impl Workflow {
    /// Create a new workflow, `pending` by construction (spec §4.4 admission ops
    /// all begin from a freshly created, `pending` workflow — external-plan
    /// handling and immediate starts apply their own transition on top).
    pub fn new(
        id: WorkflowId,
        issue_id: impl Into<String>,
        worktree_path: PathBuf,
        worktree_name: impl Into<String>,
        profile_id: ProfileId,
        external_plan: bool,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.epoch_ms();
        Self {
            id,
            issue_id: issue_id.into(),
            worktree_path,
            worktree_name: worktree_name.into(),
            profile_id,
            status: WorkflowStatus::Pending,
            current_stage: None,
            created_at_ms: now,
            started_at_ms: None,
            completed_at_ms: None,
            planned_at_ms: if external_plan { Some(now) } else { None },
            failure_reason: None,
            external_plan,
            plan_path: None,
        }
    }

    /// Validate and apply a status transition per the graph in spec §4.3.
    /// Any edge not listed here is a bug (spec §3 invariant 3), and this is
    /// the single choke point where a caller can introduce one — every
    /// scheduler/runner mutation of `status` goes through it.
    pub fn transition(&mut self, to: WorkflowStatus) -> Result<(), WorkflowTransitionError> {
        use WorkflowStatus::*;
        let allowed = matches!(
            (self.status, to),
            (Pending, Planning)
                | (Pending, InProgress)
                | (Planning, Blocked)
                | (Planning, Failed)
                | (Blocked, InProgress)
                | (Blocked, Cancelled)
                | (InProgress, Blocked)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Cancelled)
        );
        if !allowed {
            return Err(WorkflowTransitionError { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }

    /// `cancel` is idempotent on terminal states (spec §4.3 "Idempotency").
    /// Returns `true` if this call actually performed the cancellation.
    pub fn cancel(&mut self, now_ms: u64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        // Pending workflows never held a worktree slot or a running task;
        // cancel them directly rather than routing through `in_progress`.
        self.status = WorkflowStatus::Cancelled;
        self.completed_at_ms = Some(now_ms);
        true
    }

    /// `start` is rejected on non-`pending` states (spec §4.3 "Idempotency").
    pub fn can_start(&self) -> bool {
        self.status == WorkflowStatus::Pending
    }

    pub fn mark_started(&mut self, stage: Stage, now_ms: u64) {
        self.started_at_ms.get_or_insert(now_ms);
        self.current_stage = Some(stage);
    }

    pub fn mark_terminal(&mut self, status: WorkflowStatus, now_ms: u64) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.completed_at_ms = Some(now_ms);
        self.current_stage = None;
    }
}

crate::builder! {
    pub struct WorkflowBuilder => Workflow {
        into {
            issue_id: String = "ISS-1",
            worktree_name: String = "test-worktree",
        }
        set {
            id: WorkflowId = WorkflowId::new(),
            worktree_path: PathBuf = PathBuf::from("/tmp/worktree"),
            profile_id: ProfileId = ProfileId::new(),
            status: WorkflowStatus = WorkflowStatus::Pending,
            current_stage: Option<Stage> = None,
            created_at_ms: u64 = 0,
            started_at_ms: Option<u64> = None,
            completed_at_ms: Option<u64> = None,
            planned_at_ms: Option<u64> = None,
            external_plan: bool = false,
        }
        option {
            failure_reason: String = None,
            plan_path: PathBuf = None,
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
