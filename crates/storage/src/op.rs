// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The durable mutation log entry type.
//!
//! Spec §4.1 describes a relational store with transactional writes; this
//! crate realizes that contract with a WAL of [`WalOp`]s plus periodic
//! snapshots of [`crate::state::MaterializedState`] (SPEC_FULL §2), the way
//! the teacher's daemon treats `oj_core::Event` as both wire message and
//! durable record. A `WalOp` is strictly larger than a wire `Event`: it also
//! covers settings/profile/workflow writes that never cross the event bus.

use amelia_core::{
    Event, Profile, ProfileId, ServerSettings, TaskPlan, TokenUsageRow, Workflow, WorkflowId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalOp {
    WorkflowCreated { workflow: Workflow },
    WorkflowUpdated { workflow: Workflow },
    WorkflowDeleted { id: WorkflowId },
    EventAppended { event: Event },
    SettingsUpdated { settings: ServerSettings },
    ProfileUpserted { profile: Profile },
    ProfileDeleted { id: ProfileId },
    ProfileActivated { id: ProfileId },
    TokenUsageAppended { row: TokenUsageRow },
    /// Replaces the workflow's stored plan wholesale (spec §3 "Workflow owns
    /// ... its TaskPlan (0..1)"). Architect's initial write and every
    /// per-task status update from the Developer both go through this full
    /// replacement rather than a field-level patch op, keeping
    /// `apply_op` idempotent the same way `WorkflowUpdated` is.
    TaskPlanUpdated { workflow_id: WorkflowId, plan: TaskPlan },
}
