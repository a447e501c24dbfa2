// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Materialized state derived from [`crate::op::WalOp`] replay.
//!
//! Mirrors the teacher's `oj_storage::state::MaterializedState`: every
//! durable entity lives in one struct, rebuilt from the WAL (plus a
//! snapshot baseline) rather than queried from a relational engine on
//! every call (spec §4.1, SPEC_FULL §2).

use crate::op::WalOp;
use amelia_core::{
    Event, Profile, ProfileId, ServerSettings, TaskPlan, TokenUsageRow, Workflow, WorkflowId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub workflows: HashMap<WorkflowId, Workflow>,
    /// Events per workflow, kept in ascending `sequence` order.
    pub events: HashMap<WorkflowId, Vec<Event>>,
    pub profiles: HashMap<ProfileId, Profile>,
    pub active_profile_id: Option<ProfileId>,
    pub settings: ServerSettings,
    pub token_usage: Vec<TokenUsageRow>,
    pub task_plans: HashMap<WorkflowId, TaskPlan>,
}

impl MaterializedState {
    pub fn list_pending(&self) -> Vec<&Workflow> {
        self.workflows
            .values()
            .filter(|w| w.status == amelia_core::WorkflowStatus::Pending)
            .collect()
    }

    pub fn list_active(&self) -> Vec<&Workflow> {
        self.workflows.values().filter(|w| w.status.holds_worktree_slot()).collect()
    }

    pub fn events_for(&self, workflow_id: WorkflowId, since_sequence: Option<u64>) -> Vec<&Event> {
        let Some(rows) = self.events.get(&workflow_id) else {
            return Vec::new();
        };
        match since_sequence {
            Some(since) => rows.iter().filter(|e| e.sequence > since).collect(),
            None => rows.iter().collect(),
        }
    }

    pub fn last_sequence(&self, workflow_id: WorkflowId) -> u64 {
        self.events.get(&workflow_id).and_then(|rows| rows.last()).map(|e| e.sequence).unwrap_or(0)
    }

    /// Apply one durable operation.
    ///
    /// # Idempotency
    ///
    /// An operation may be applied twice: once immediately when a
    /// repository method appends it (for read-your-writes visibility) and
    /// again when the scheduler replays the WAL after a restart. Every
    /// branch below must leave the same state whether applied once or
    /// twice — full-struct replacement (`insert`) is naturally idempotent;
    /// append-only collections (`events`, `token_usage`) are guarded by an
    /// existence/equality check instead of a raw `push`.
    pub fn apply_op(&mut self, op: &WalOp) {
        match op {
            WalOp::WorkflowCreated { workflow } | WalOp::WorkflowUpdated { workflow } => {
                self.workflows.insert(workflow.id, workflow.clone());
            }
            WalOp::WorkflowDeleted { id } => {
                self.workflows.remove(id);
                self.events.remove(id);
                self.task_plans.remove(id);
            }
            WalOp::EventAppended { event } => {
                let rows = self.events.entry(event.workflow_id).or_default();
                if !rows.iter().any(|e| e.id == event.id) {
                    rows.push(event.clone());
                    rows.sort_by_key(|e| e.sequence);
                }
            }
            WalOp::SettingsUpdated { settings } => {
                self.settings = settings.clone();
            }
            WalOp::ProfileUpserted { profile } => {
                self.profiles.insert(profile.id, profile.clone());
            }
            WalOp::ProfileDeleted { id } => {
                self.profiles.remove(id);
                if self.active_profile_id == Some(*id) {
                    self.active_profile_id = None;
                }
            }
            WalOp::ProfileActivated { id } => {
                self.active_profile_id = Some(*id);
                for (profile_id, profile) in self.profiles.iter_mut() {
                    profile.is_active = profile_id == id;
                }
            }
            WalOp::TokenUsageAppended { row } => {
                if !self.token_usage.iter().any(|r| r == row) {
                    self.token_usage.push(row.clone());
                }
            }
            WalOp::TaskPlanUpdated { workflow_id, plan } => {
                self.task_plans.insert(*workflow_id, plan.clone());
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
