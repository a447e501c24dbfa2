// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Checkpointed restart (spec §4.4 "Checkpointed restart", §9 "Restart
//! semantics — open question").
//!
//! Nested inside `scheduler` (rather than a crate-level sibling) so its
//! methods get the same private-field access as the rest of
//! [`super::Scheduler`]'s admission ops — this is a continuation of that
//! aggregate's behavior, not a separate concern.
//!
//! Called once at process startup, after the WAL has replayed into
//! [`amelia_storage::MaterializedState`] but before the HTTP/WebSocket
//! layers start accepting traffic. The open question in spec §9 is resolved
//! here behind `ServerSettings.checkpoint_retention_days`: `0` (the spec's
//! recommended default) fails every in-flight workflow with
//! `orchestrator_restart`; a positive value resumes them instead.

use super::Scheduler;
use crate::error::SchedulerError;
use amelia_core::{Clock, Event, EventType, Workflow, WorkflowId, WorkflowStatus};
use amelia_storage::{EventRepository, SettingsRepository, TaskPlanRepository, WorkflowFilter, WorkflowRepository};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

impl<C: Clock + 'static> Scheduler<C> {
    /// Scan the store for workflows left in a non-terminal, non-`pending`
    /// state by a prior process and either resume or fail them (spec §4.4).
    ///
    /// Must be called before any admission op runs, and exactly once — it
    /// assumes every worktree slot starts empty.
    pub async fn resume_from_checkpoint(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let settings = SettingsRepository::get(&*self.store)?;
        let resumable = settings.resumes_on_restart();

        let mut in_flight = WorkflowRepository::list(
            &*self.store,
            WorkflowFilter { status: Some(WorkflowStatus::Planning), worktree_path: None, limit: None },
        )?;
        in_flight.extend(WorkflowRepository::list_active(&*self.store)?);

        for workflow in in_flight {
            if !resumable {
                if workflow.status == WorkflowStatus::Blocked {
                    // Blocked workflows have no execution task to lose —
                    // they were already durably waiting on a human decision.
                    // Re-occupy the slot so invariant §3.1 holds and leave
                    // them blocked; only in-flight phases get failed below.
                    self.reoccupy_slot_with_placeholder(workflow.id, &workflow.worktree_path);
                    continue;
                }
                self.fail_on_restart(workflow)?;
                continue;
            }

            match workflow.status {
                WorkflowStatus::Blocked => {
                    self.reoccupy_slot_with_placeholder(workflow.id, &workflow.worktree_path);
                }
                WorkflowStatus::Planning | WorkflowStatus::InProgress => {
                    self.resume_execution_task(workflow).await?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn fail_on_restart(&self, mut workflow: Workflow) -> Result<(), SchedulerError> {
        workflow.failure_reason = Some("orchestrator_restart".to_string());
        workflow.mark_terminal(WorkflowStatus::Failed, self.clock.epoch_ms());
        let workflow_id = workflow.id;
        WorkflowRepository::update(&*self.store, workflow)?;
        let event =
            Event::new(workflow_id, EventType::WorkflowFailed, "orchestrator_restart", self.clock.epoch_ms()).as_error();
        let stored = EventRepository::append(&*self.store, event)?;
        self.bus.emit(stored);
        Ok(())
    }

    /// Re-occupy a worktree slot with a no-op task handle so the slot shows
    /// busy (invariant §3.1) even though nothing is actively running —
    /// correct for `blocked` workflows, which wait on a human `approve`/
    /// `reject` call rather than a supervised task.
    fn reoccupy_slot_with_placeholder(&self, workflow_id: WorkflowId, worktree_path: &Path) {
        let handle = tokio::spawn(async {});
        match self.slots.try_reserve(worktree_path) {
            Ok(reservation) => self.slots.occupy(reservation, workflow_id, handle),
            Err(_) => {
                tracing::error!(
                    workflow_id = %workflow_id,
                    worktree = %worktree_path.display(),
                    "restart: worktree slot already held by another resumed workflow"
                );
            }
        }
    }

    async fn resume_execution_task(self: &Arc<Self>, workflow: Workflow) -> Result<(), SchedulerError> {
        let workflow_id = workflow.id;
        let worktree_path = workflow.worktree_path.clone();
        let profile = self.resolve_profile(Some(workflow.profile_id))?;
        let plan = TaskPlanRepository::get(&*self.store, workflow_id)?;
        let skip_architect = crate::supervisor::resumes_at_execution(workflow.status) && plan.is_some();

        let reservation = match self.slots.try_reserve(&worktree_path) {
            Ok(reservation) => reservation,
            Err(_) => {
                tracing::error!(
                    workflow_id = %workflow_id,
                    worktree = %worktree_path.display(),
                    "restart: worktree slot already held by another resumed workflow"
                );
                return Ok(());
            }
        };

        let scheduler = Arc::clone(self);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async move {
            scheduler.run_supervised(workflow, profile, plan, skip_architect, cancel).await;
        });
        self.slots.occupy(reservation, workflow_id, handle);
        Ok(())
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
