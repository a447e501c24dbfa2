// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Turns a runner's [`Effect`] into a persisted, sequenced event and/or a
//! workflow/task-plan mutation (SPEC_FULL §2 "Effect/Event separation").
//!
//! Mirrors the teacher's `engine::Executor::execute`: the single place that
//! calls into storage on a runner's behalf, logging each effect the way
//! `Executor::execute` logs `event = .., elapsed_ms, ...` for every one it
//! performs.

use amelia_agents::Effect;
use amelia_core::{AmeliaError, WorkflowId};
use amelia_bus::EventBus;
use amelia_storage::{EventRepository, Store, TaskPlanRepository, WorkflowRepository};
use std::sync::Arc;
use std::time::Instant;

/// Performs [`Effect`]s for one workflow, persisting through `store` and
/// fanning finished events out through `bus`.
#[derive(Clone)]
pub struct Executor {
    store: Arc<Store>,
    bus: EventBus,
}

impl Executor {
    pub fn new(store: Arc<Store>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Perform one effect, returning once it's durably applied.
    pub async fn perform(&self, workflow_id: WorkflowId, effect: Effect) -> Result<(), AmeliaError> {
        let start = Instant::now();
        let kind = effect_kind(&effect);

        let result = match effect {
            Effect::EmitEvent(event) => {
                let stored = EventRepository::append(&*self.store, event)?;
                self.bus.emit(stored);
                Ok(())
            }
            Effect::WriteTaskPlan(plan) => {
                TaskPlanRepository::upsert(&*self.store, workflow_id, plan)
            }
            Effect::SetPlanPath(path) => {
                let mut workflow = WorkflowRepository::get(&*self.store, workflow_id)?
                    .ok_or_else(|| AmeliaError::not_found(format!("workflow {workflow_id} not found")))?;
                workflow.plan_path = Some(path);
                WorkflowRepository::update(&*self.store, workflow)
            }
            Effect::UpdateTaskStatus { task_id, status } => {
                let mut plan = TaskPlanRepository::get(&*self.store, workflow_id)?
                    .ok_or_else(|| AmeliaError::not_found(format!("no task plan for workflow {workflow_id}")))?;
                match plan.task_mut(task_id) {
                    Some(task) => task.status = status,
                    None => {
                        return Err(AmeliaError::not_found(format!(
                            "task {task_id} not found in workflow {workflow_id}'s plan"
                        )))
                    }
                }
                TaskPlanRepository::upsert(&*self.store, workflow_id, plan)
            }
        };

        let elapsed_ms = start.elapsed().as_millis();
        match &result {
            Ok(()) => {
                tracing::debug!(workflow_id = %workflow_id, effect = kind, elapsed_ms, "effect applied");
            }
            Err(err) => {
                tracing::warn!(workflow_id = %workflow_id, effect = kind, elapsed_ms, error = %err, "effect failed");
            }
        }
        result
    }
}

fn effect_kind(effect: &Effect) -> &'static str {
    match effect {
        Effect::EmitEvent(_) => "emit_event",
        Effect::WriteTaskPlan(_) => "write_task_plan",
        Effect::SetPlanPath(_) => "set_plan_path",
        Effect::UpdateTaskStatus { .. } => "update_task_status",
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
