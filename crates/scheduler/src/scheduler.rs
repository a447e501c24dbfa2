// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The Orchestrator Scheduler (spec §4.4, C6) — the hard part: admission
//! control, per-worktree mutual exclusion, the concurrency cap, and
//! supervising the execution tasks [`crate::supervisor::Supervisor`] drives.
//!
//! Mirrors the shape of the teacher's runtime dispatch loop: one long-lived
//! aggregate holding the durable store, the bus, and the admission maps,
//! with each admission op a short critical section (read → decide → write →
//! release) that either returns immediately or hands off to a spawned task.

use crate::error::SchedulerError;
use crate::executor::Executor;
use crate::request::{BatchResult, BatchSelector, CreateWorkflowRequest, ExternalPlanSource, SetExternalPlanRequest};
use crate::supervisor::{resumes_at_execution, Outcome, Supervisor};
use crate::worktree::{ReserveError, WorktreeSlots};
use amelia_agents::{AgentContext, Effect, IssueBrief};
use amelia_bus::EventBus;
use amelia_core::{
    AgentRole, Clock, Event, EventType, Profile, ProfileId, Stage, Task, TaskPlan, Workflow, WorkflowId,
    WorkflowStatus,
};
use amelia_driver::DriverFactory;
use amelia_storage::{
    EventRepository, ProfileRepository, SettingsRepository, Store, TaskPlanRepository, WorkflowFilter,
    WorkflowRepository,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[path = "restart.rs"]
mod restart;

/// The scheduler aggregate. Cheaply passed around as `Arc<Scheduler<C>>`
/// since spawned execution tasks need to outlive the admission call that
/// started them.
pub struct Scheduler<C: Clock + 'static> {
    store: Arc<Store>,
    bus: EventBus,
    executor: Executor,
    driver_factory: Arc<dyn DriverFactory>,
    slots: WorktreeSlots,
    clock: C,
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Builds the scheduler, sizing the concurrency semaphore from
    /// `ServerSettings.max_concurrent` as currently persisted (spec §4.4).
    pub fn new(
        store: Arc<Store>,
        bus: EventBus,
        driver_factory: Arc<dyn DriverFactory>,
        clock: C,
    ) -> Result<Self, SchedulerError> {
        SettingsRepository::ensure_defaults(&*store)?;
        let settings = SettingsRepository::get(&*store)?;
        let executor = Executor::new(Arc::clone(&store), bus.clone());
        Ok(Self {
            store,
            bus,
            executor,
            driver_factory,
            slots: WorktreeSlots::new(settings.max_concurrent),
            clock,
        })
    }

    /// Re-read `ServerSettings.max_concurrent` and resize the semaphore
    /// (called after `PUT /api/settings` changes it).
    pub fn refresh_capacity(&self) -> Result<(), SchedulerError> {
        let settings = SettingsRepository::get(&*self.store)?;
        self.slots.set_capacity(settings.max_concurrent);
        Ok(())
    }

    pub fn worktree_in_progress_count(&self) -> usize {
        self.slots.in_progress_count()
    }

    // ---- shared helpers ----------------------------------------------

    fn resolve_profile(&self, profile_id: Option<ProfileId>) -> Result<Profile, SchedulerError> {
        if let Some(id) = profile_id {
            return ProfileRepository::get(&*self.store, id)?
                .ok_or_else(|| SchedulerError::Validation(format!("profile {id} not found")));
        }
        ProfileRepository::list(&*self.store)?
            .into_iter()
            .find(|p| p.is_active)
            .ok_or_else(|| SchedulerError::Validation("no active profile configured".to_string()))
    }

    fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, SchedulerError> {
        WorkflowRepository::get(&*self.store, id)?.ok_or(SchedulerError::WorkflowNotFound(id))
    }

    fn emit(&self, workflow_id: WorkflowId, event_type: EventType, message: impl Into<String>) {
        let event = Event::new(workflow_id, event_type, message, self.clock.epoch_ms());
        if let Err(err) = self.store_and_bus_emit(workflow_id, event) {
            tracing::warn!(workflow_id = %workflow_id, error = %err, "failed to persist scheduler event");
        }
    }

    fn store_and_bus_emit(&self, _workflow_id: WorkflowId, event: Event) -> Result<(), amelia_core::AmeliaError> {
        let stored = EventRepository::append(&*self.store, event)?;
        self.bus.emit(stored);
        Ok(())
    }

    fn persist_transition(&self, workflow: &mut Workflow, to: WorkflowStatus) -> Result<(), SchedulerError> {
        workflow
            .transition(to)
            .map_err(|err| SchedulerError::Validation(err.to_string()))?;
        WorkflowRepository::update(&*self.store, workflow.clone())?;
        Ok(())
    }

    /// Wraps raw external-plan content in a single-task plan so the
    /// Developer phase has something to iterate (spec §1 "markdown parsing
    /// of plans/design docs" stays a named external collaborator; the core
    /// doesn't parse structure out of it — see DESIGN.md).
    fn wrap_external_plan(issue_id: &str, content: String) -> TaskPlan {
        let goal = content.lines().next().unwrap_or(issue_id).trim().to_string();
        let task = Task::new(content);
        TaskPlan::new(if goal.is_empty() { issue_id.to_string() } else { goal }, Vec::new(), vec![task])
    }

    async fn read_plan_source(source: ExternalPlanSource) -> Result<String, SchedulerError> {
        match source {
            ExternalPlanSource::Content(content) => Ok(content),
            ExternalPlanSource::File(path) => tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| SchedulerError::Validation(format!("failed to read plan file {path:?}: {err}"))),
        }
    }

    fn plan_output_path(profile: &Profile, workflow: &Workflow) -> PathBuf {
        let relative = profile
            .plan_path_pattern
            .replace("{worktree_name}", &workflow.worktree_name)
            .replace("{issue_id}", &workflow.issue_id);
        profile.plan_output_dir.join(relative)
    }

    async fn write_plan_file(path: &std::path::Path, content: &str) -> Result<(), SchedulerError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| SchedulerError::Validation(err.to_string()))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|err| SchedulerError::Validation(err.to_string()))
    }

    // ---- create ---------------------------------------------------------

    /// Common construction path for every op that creates a new workflow row
    /// (spec §4.4). Always created `pending`; `external_plan` controls
    /// whether `planned_at_ms` is set at creation (spec §3 invariant 4).
    async fn create_workflow(&self, req: CreateWorkflowRequest) -> Result<(Workflow, Profile), SchedulerError> {
        if !req.worktree_path.is_absolute() {
            return Err(SchedulerError::Validation("worktree_path must be absolute".to_string()));
        }
        let profile = self.resolve_profile(req.profile_id)?;
        let worktree_name = req
            .worktree_name
            .clone()
            .or_else(|| req.worktree_path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| req.issue_id.clone());

        let has_external_plan = req.external_plan.is_some();
        let workflow_id = WorkflowId::new();
        let mut workflow = Workflow::new(
            workflow_id,
            req.issue_id.clone(),
            req.worktree_path.clone(),
            worktree_name,
            profile.id,
            has_external_plan,
            &self.clock,
        );
        WorkflowRepository::create(&*self.store, workflow.clone())?;
        self.emit(workflow_id, EventType::WorkflowCreated, format!("workflow created for {}", req.issue_id));

        if let Some(source) = req.external_plan {
            let content = Self::read_plan_source(source).await?;
            let plan = Self::wrap_external_plan(&req.issue_id, content.clone());
            let path = Self::plan_output_path(&profile, &workflow);
            Self::write_plan_file(&path, &content).await?;
            TaskPlanRepository::upsert(&*self.store, workflow_id, plan)?;
            workflow.plan_path = Some(path);
            WorkflowRepository::update(&*self.store, workflow.clone())?;
        }

        Ok((workflow, profile))
    }

    /// `queue_workflow` (spec §4.4): create `pending`, no task spawned.
    pub async fn queue_workflow(&self, req: CreateWorkflowRequest) -> Result<WorkflowId, SchedulerError> {
        let (workflow, _profile) = self.create_workflow(req).await?;
        Ok(workflow.id)
    }

    /// `start_workflow` (spec §4.4): create, then immediately admit.
    pub async fn start_workflow(self: &Arc<Self>, req: CreateWorkflowRequest) -> Result<WorkflowId, SchedulerError> {
        let (workflow, _profile) = self.create_workflow(req).await?;
        self.start_pending_workflow(workflow.id).await?;
        Ok(workflow.id)
    }

    /// `queue_and_plan_workflow` (spec §4.4): create `pending`, run the
    /// Architect in the background without ever leaving `pending` — a
    /// deliberate departure from the normal `pending → planning` edge (see
    /// DESIGN.md "queue_and_plan_workflow status"). Success sets
    /// `planned_at_ms`; failure leaves the workflow exactly as it was,
    /// pending and unplanned, so the caller can simply try again.
    pub async fn queue_and_plan_workflow(self: &Arc<Self>, req: CreateWorkflowRequest) -> Result<WorkflowId, SchedulerError> {
        if req.external_plan.is_some() {
            return Err(SchedulerError::Validation(
                "queue_and_plan_workflow does not accept an external plan".to_string(),
            ));
        }
        let (workflow, profile) = self.create_workflow(req.clone()).await?;
        let workflow_id = workflow.id;

        let scheduler = Arc::clone(self);
        let issue = IssueBrief {
            issue_id: req.issue_id,
            task_title: req.task_title,
            task_description: req.task_description,
        };
        tokio::spawn(async move {
            let ctx = scheduler.build_context(&workflow, profile, AgentRole::Architect);
            let supervisor = Supervisor {
                workflow_id,
                ctx,
                executor: scheduler.executor.clone(),
                cancel: CancellationToken::new(),
            };
            match supervisor.run_planning(issue).await {
                Outcome::AwaitingApproval => {
                    if let Ok(mut workflow) = scheduler.get_workflow(workflow_id) {
                        workflow.planned_at_ms = Some(scheduler.clock.epoch_ms());
                        let _ = WorkflowRepository::update(&*scheduler.store, workflow);
                    }
                    scheduler.emit(workflow_id, EventType::PlanUpdated, "background plan ready");
                }
                Outcome::Failed { reason } => {
                    tracing::warn!(workflow_id = %workflow_id, reason, "queue_and_plan_workflow: planning failed, leaving pending");
                }
                Outcome::Cancelled | Outcome::Completed | Outcome::NeedsConfirmation { .. } => {}
            }
        });

        Ok(workflow_id)
    }

    // ---- admit ------------------------------------------------------------

    /// `start_pending_workflow` (spec §4.4): admit a `pending` workflow,
    /// taking the worktree slot and concurrency permit atomically with the
    /// status transition, then spawn its execution task.
    pub async fn start_pending_workflow(self: &Arc<Self>, id: WorkflowId) -> Result<(), SchedulerError> {
        let mut workflow = self.get_workflow(id)?;
        if !workflow.can_start() {
            return Err(SchedulerError::WrongState { id, status: workflow.status, expected: "pending" });
        }

        // Held for the rest of this call: dropping it un-consumed (any early
        // `?` below) releases the slot instead of leaking it (see
        // `WorktreeSlots::try_reserve`).
        let reservation = self.slots.try_reserve(&workflow.worktree_path).map_err(|err| match err {
            ReserveError::WorktreeBusy => SchedulerError::WorktreeConflict(workflow.worktree_path.clone()),
            ReserveError::ConcurrencyLimit => {
                SchedulerError::ConcurrencyLimit(self.slots.in_progress_count() as u32)
            }
        })?;

        let profile = self.resolve_profile(Some(workflow.profile_id))?;
        let existing_plan = TaskPlanRepository::get(&*self.store, id)?;
        let skip_architect = workflow.external_plan || workflow.planned_at_ms.is_some() || existing_plan.is_some();

        let to_status = if skip_architect { WorkflowStatus::InProgress } else { WorkflowStatus::Planning };
        self.persist_transition(&mut workflow, to_status)?;
        workflow.mark_started(if skip_architect { Stage::Developer } else { Stage::Architect }, self.clock.epoch_ms());
        WorkflowRepository::update(&*self.store, workflow.clone())?;
        self.emit(id, EventType::WorkflowStarted, "workflow started");

        let cancel = CancellationToken::new();
        let scheduler = Arc::clone(self);
        let workflow_for_task = workflow.clone();
        let cancel_for_task = cancel.clone();
        let handle = tokio::spawn(async move {
            scheduler.run_supervised(workflow_for_task, profile, existing_plan, skip_architect, cancel_for_task).await;
        });
        self.slots.occupy(reservation, id, handle);
        Ok(())
    }

    /// `start_batch_workflows` (spec §4.4, §6): iterate candidates
    /// sequentially (so the documented tie-break — "only the first is
    /// admitted" per worktree — is deterministic), collecting per-id errors
    /// rather than aborting the batch.
    pub async fn start_batch_workflows(self: &Arc<Self>, selector: BatchSelector) -> Result<BatchResult, SchedulerError> {
        let candidates: Vec<WorkflowId> = match selector {
            BatchSelector::WorkflowIds(ids) => ids,
            BatchSelector::Worktree(path) => WorkflowRepository::list(
                &*self.store,
                WorkflowFilter { status: Some(WorkflowStatus::Pending), worktree_path: Some(path), limit: None },
            )?
            .into_iter()
            .map(|w| w.id)
            .collect(),
            BatchSelector::AllPending => {
                WorkflowRepository::list_pending(&*self.store)?.into_iter().map(|w| w.id).collect()
            }
        };

        let mut result = BatchResult::default();
        for id in candidates {
            match self.start_pending_workflow(id).await {
                Ok(()) => result.started.push(id),
                Err(err) => result.errors.push((id, err.to_string())),
            }
        }
        Ok(result)
    }

    /// Re-entrant execution body shared by a fresh admission and a restart
    /// resume (spec §4.4 "Execution task", "Checkpointed restart").
    async fn run_supervised(
        self: Arc<Self>,
        workflow: Workflow,
        profile: Profile,
        existing_plan: Option<TaskPlan>,
        skip_architect: bool,
        cancel: CancellationToken,
    ) {
        let workflow_id = workflow.id;
        let worktree_path = workflow.worktree_path.clone();

        let plan = if skip_architect {
            existing_plan
        } else {
            let ctx = self.build_context(&workflow, profile.clone(), AgentRole::Architect);
            let supervisor = Supervisor { workflow_id, ctx, executor: self.executor.clone(), cancel: cancel.clone() };
            let issue = IssueBrief::new(workflow.issue_id.clone());
            match supervisor.run_planning(issue).await {
                Outcome::AwaitingApproval => {
                    self.finish_planning(workflow_id, &worktree_path).await;
                    return;
                }
                Outcome::Failed { reason } => {
                    self.fail_workflow(workflow_id, &worktree_path, reason).await;
                    return;
                }
                Outcome::Cancelled => {
                    self.cancel_finish(workflow_id, &worktree_path).await;
                    return;
                }
                Outcome::Completed | Outcome::NeedsConfirmation { .. } => unreachable!(
                    "Supervisor::run_planning only returns AwaitingApproval, Failed, or Cancelled"
                ),
            }
        };

        let Some(plan) = plan else {
            self.fail_workflow(workflow_id, &worktree_path, "no task plan available to execute".to_string()).await;
            return;
        };

        let ctx = self.build_context(&workflow, profile, AgentRole::Developer);
        let supervisor = Supervisor { workflow_id, ctx, executor: self.executor.clone(), cancel: cancel.clone() };
        match supervisor.run_execution(plan).await {
            Outcome::Completed => self.complete_workflow(workflow_id, &worktree_path).await,
            Outcome::Failed { reason } => self.fail_workflow(workflow_id, &worktree_path, reason).await,
            Outcome::Cancelled => self.cancel_finish(workflow_id, &worktree_path).await,
            Outcome::NeedsConfirmation { feedback } => self.block_for_confirmation(workflow_id, &worktree_path, feedback).await,
            Outcome::AwaitingApproval => unreachable!("Supervisor::run_execution never returns AwaitingApproval"),
        }
    }

    fn build_context(&self, workflow: &Workflow, profile: Profile, driver_role: AgentRole) -> AgentContext<C> {
        let stream_tool_results = SettingsRepository::get(&*self.store).map(|s| s.stream_tool_results).unwrap_or(true);
        let driver = self.driver_factory.driver_for(profile.config_for(driver_role).driver_kind);
        AgentContext {
            workflow_id: workflow.id,
            worktree_path: workflow.worktree_path.clone(),
            worktree_name: workflow.worktree_name.clone(),
            issue_id: workflow.issue_id.clone(),
            profile,
            driver,
            clock: self.clock.clone(),
            stream_tool_results,
        }
    }

    // ---- terminal/gate handlers shared by fresh runs and resumes --------

    async fn finish_planning(&self, workflow_id: WorkflowId, worktree_path: &std::path::Path) {
        if let Ok(mut workflow) = self.get_workflow(workflow_id) {
            if self.persist_transition(&mut workflow, WorkflowStatus::Blocked).is_ok() {
                self.emit(workflow_id, EventType::ApprovalRequested, "plan awaiting approval");
            }
        }
        // Planning reaching the approval gate keeps the worktree slot (spec
        // §3 invariant 1 covers `blocked` too); only the task handle, not
        // the slot, is done with this spawn.
        let _ = worktree_path;
    }

    async fn fail_workflow(&self, workflow_id: WorkflowId, worktree_path: &std::path::Path, reason: String) {
        if let Ok(mut workflow) = self.get_workflow(workflow_id) {
            workflow.failure_reason = Some(reason);
            workflow.mark_terminal(WorkflowStatus::Failed, self.clock.epoch_ms());
            let _ = WorkflowRepository::update(&*self.store, workflow);
        }
        self.emit(workflow_id, EventType::WorkflowFailed, "workflow failed");
        self.slots.release(worktree_path);
    }

    async fn complete_workflow(&self, workflow_id: WorkflowId, worktree_path: &std::path::Path) {
        if let Ok(mut workflow) = self.get_workflow(workflow_id) {
            workflow.mark_terminal(WorkflowStatus::Completed, self.clock.epoch_ms());
            let _ = WorkflowRepository::update(&*self.store, workflow);
        }
        self.emit(workflow_id, EventType::WorkflowCompleted, "workflow completed");
        self.slots.release(worktree_path);
    }

    async fn cancel_finish(&self, workflow_id: WorkflowId, worktree_path: &std::path::Path) {
        if let Ok(mut workflow) = self.get_workflow(workflow_id) {
            workflow.cancel(self.clock.epoch_ms());
            let _ = WorkflowRepository::update(&*self.store, workflow);
        }
        self.emit(workflow_id, EventType::WorkflowCancelled, "workflow cancelled");
        self.slots.release(worktree_path);
    }

    async fn block_for_confirmation(&self, workflow_id: WorkflowId, worktree_path: &std::path::Path, feedback: String) {
        if let Ok(mut workflow) = self.get_workflow(workflow_id) {
            if self.persist_transition(&mut workflow, WorkflowStatus::Blocked).is_ok() {
                self.emit(
                    workflow_id,
                    EventType::ApprovalRequested,
                    format!("reviewer rejected, awaiting confirmation: {feedback}"),
                );
            }
        }
        let _ = worktree_path;
    }

    // ---- approval gate ----------------------------------------------------

    /// `approve_plan` (spec §4.3, §4.4): resumes the run. If the gate was
    /// the initial plan (no task has reached `completed`/`failed` yet), this
    /// is effectively `start_pending_workflow` with the architect phase
    /// already behind it.
    pub async fn approve_plan(self: &Arc<Self>, id: WorkflowId) -> Result<(), SchedulerError> {
        let mut workflow = self.get_workflow(id)?;
        if workflow.status != WorkflowStatus::Blocked {
            return Err(SchedulerError::WrongState { id, status: workflow.status, expected: "blocked" });
        }
        let plan = TaskPlanRepository::get(&*self.store, id)?
            .ok_or_else(|| SchedulerError::Validation(format!("workflow {id} has no plan to approve")))?;

        self.persist_transition(&mut workflow, WorkflowStatus::InProgress)?;
        self.emit(id, EventType::ApprovalGranted, "plan approved");

        let profile = self.resolve_profile(Some(workflow.profile_id))?;
        let cancel = CancellationToken::new();
        let scheduler = Arc::clone(self);
        let worktree_path = workflow.worktree_path.clone();
        let workflow_for_task = workflow.clone();
        let cancel_for_task = cancel.clone();
        let handle = tokio::spawn(async move {
            scheduler.run_supervised(workflow_for_task, profile, Some(plan), true, cancel_for_task).await;
        });

        // The worktree slot has been held continuously since planning first
        // admitted this workflow (spec §3 invariant 1 covers `blocked` too);
        // swap in the resumed task's handle rather than releasing and
        // re-reserving, which would open a window for another workflow to
        // steal the permit.
        if !self.slots.replace_handle(&worktree_path, handle) {
            tracing::warn!(workflow_id = %id, "approve_plan: worktree slot was not held, admitting fresh");
        }
        Ok(())
    }

    /// `reject_plan` (spec §4.3): terminates the run. `blocked → cancelled`
    /// is the only outgoing edge for a rejected plan (spec §4.3's graph has
    /// no `blocked → failed` edge).
    pub async fn reject_plan(&self, id: WorkflowId, feedback: Option<String>) -> Result<(), SchedulerError> {
        let mut workflow = self.get_workflow(id)?;
        if workflow.status != WorkflowStatus::Blocked {
            return Err(SchedulerError::WrongState { id, status: workflow.status, expected: "blocked" });
        }
        workflow.failure_reason = feedback.clone().or_else(|| Some("plan rejected".to_string()));
        self.persist_transition(&mut workflow, WorkflowStatus::Cancelled)?;
        self.emit(id, EventType::ApprovalRejected, feedback.unwrap_or_else(|| "plan rejected".to_string()));
        self.slots.release(&workflow.worktree_path);
        Ok(())
    }

    // ---- cancellation -----------------------------------------------------

    /// `cancel_workflow` (spec §4.3 "Idempotency", §4.4, §8): a no-op on an
    /// already-terminal workflow; otherwise signals the supervised task (if
    /// one is running) and transitions directly for workflows with no
    /// running task (`pending`, `blocked`).
    pub async fn cancel_workflow(&self, id: WorkflowId) -> Result<(), SchedulerError> {
        let mut workflow = self.get_workflow(id)?;
        if workflow.status.is_terminal() {
            return Ok(());
        }

        if self.slots.abort(&workflow.worktree_path) {
            // The supervised task's own unwind path persists `cancelled`
            // and releases the slot (spec §5 "Cancellation"); nothing more
            // to do here for `in_progress`/active `planning` workflows.
            return Ok(());
        }

        // No running task (pending, or blocked after planning finished and
        // nothing was ever spawned for the gate itself): transition and
        // release directly.
        workflow.cancel(self.clock.epoch_ms());
        WorkflowRepository::update(&*self.store, workflow.clone())?;
        self.emit(id, EventType::WorkflowCancelled, "workflow cancelled");
        self.slots.release(&workflow.worktree_path);
        Ok(())
    }

    // ---- external plan ------------------------------------------------

    /// `set_external_plan` (spec §4.4): writes/overwrites the plan outside
    /// the normal Architect pipeline.
    pub async fn set_external_plan(&self, id: WorkflowId, req: SetExternalPlanRequest) -> Result<(), SchedulerError> {
        let mut workflow = self.get_workflow(id)?;
        if !matches!(workflow.status, WorkflowStatus::Pending | WorkflowStatus::Planning) {
            return Err(SchedulerError::WrongState { id, status: workflow.status, expected: "pending or planning" });
        }
        let existing = TaskPlanRepository::get(&*self.store, id)?;
        if existing.is_some() && !req.force {
            return Err(SchedulerError::Validation(format!(
                "workflow {id} already has a plan; pass force=true to replace it"
            )));
        }

        let profile = self.resolve_profile(Some(workflow.profile_id))?;
        let content = Self::read_plan_source(req.source).await?;
        let plan = Self::wrap_external_plan(&workflow.issue_id, content.clone());
        let path = Self::plan_output_path(&profile, &workflow);
        Self::write_plan_file(&path, &content).await?;

        TaskPlanRepository::upsert(&*self.store, id, plan)?;
        workflow.plan_path = Some(path);
        workflow.external_plan = true;
        workflow.planned_at_ms.get_or_insert(self.clock.epoch_ms());
        WorkflowRepository::update(&*self.store, workflow)?;
        self.emit(id, EventType::PlanUpdated, "external plan set");
        Ok(())
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
