// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The runner-to-scheduler boundary (SPEC_FULL §2 "Effect/Event separation").
//!
//! Runners never touch the store or the bus; they describe what happened as
//! [`Effect`]s and hand them to an [`EffectSink`]. `amelia-scheduler::Executor`
//! is the only thing that turns an `Effect` into a persisted, sequenced
//! [`Event`] and/or a workflow mutation, mirroring how the teacher's
//! `Executor::execute` is the sole caller of `MaterializedState::apply_event`.

use amelia_core::{Event, TaskId, TaskPlan, TaskStatus};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Something a runner wants applied to workflow/task state or observed on the
/// event log. Carries no `workflow_id`/`sequence` — the executor fills those
/// in from the phase's [`crate::AgentContext`] and the store respectively.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Persist and fan out an event. `sequence` is always 0 here; the
    /// executor's `EventRepository::append` assigns the real one.
    EmitEvent(Event),
    /// Replace the workflow's stored task plan.
    WriteTaskPlan(TaskPlan),
    /// Record where the plan markdown was written.
    SetPlanPath(PathBuf),
    /// Update one task's status within the stored plan.
    UpdateTaskStatus { task_id: TaskId, status: TaskStatus },
}

/// A channel-backed sink runners push [`Effect`]s into as they make progress,
/// rather than batching everything until the phase completes — the
/// Developer's per-task events would otherwise only reach observers after
/// every task had already finished.
#[derive(Clone)]
pub struct EffectSink(mpsc::UnboundedSender<Effect>);

impl EffectSink {
    pub fn new(tx: mpsc::UnboundedSender<Effect>) -> Self {
        Self(tx)
    }

    /// Returns `false` if the receiving end (the executor) has gone away;
    /// runners should treat that as a signal to stop making further progress.
    pub fn emit(&self, effect: Effect) -> bool {
        self.0.send(effect).is_ok()
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
