// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The execution task: Architect → approval gate → Developer loop → Reviewer
//! → optional revision cycles (spec §4.4 "Execution task").
//!
//! Owns nothing durable itself — every state transition and event goes
//! through [`crate::executor::Executor`], so a [`Supervisor`] can be dropped
//! (process crash, hard cancellation) at any point without corrupting
//! anything beyond losing whatever wasn't yet persisted, the same guarantee
//! WAL-backed storage gives the teacher's own `Executor`-driven engine loop.

use crate::backoff::{self, DEFAULT_MAX_ATTEMPTS};
use crate::executor::Executor;
use amelia_agents::{architect, developer, reviewer, AgentContext, AgentRunnerError, Effect, EffectSink, IssueBrief, ReviewOutcome};
use amelia_core::{Clock, Event, EventType, Stage, TaskPlan, WorkflowId, WorkflowStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What the execution task reached when it stopped running.
#[derive(Debug)]
pub enum Outcome {
    /// Architect finished; the workflow should move to `blocked` awaiting
    /// approval.
    AwaitingApproval,
    /// Developer + Reviewer finished with an approved review.
    Completed,
    /// A review was rejected and neither auto-approval nor remaining
    /// iterations apply; the workflow should move to `blocked` awaiting
    /// human confirmation, carrying the feedback.
    NeedsConfirmation { feedback: String },
    /// A phase failed after exhausting retries, or produced a malformed
    /// result.
    Failed { reason: String },
    /// The cancellation token fired before the task reached a natural stop.
    Cancelled,
}

/// Drives one phase sequence for a single workflow. Constructed fresh for
/// each execution task the scheduler spawns (planning, or a post-approval
/// resume) — it is not reused across a workflow's `blocked` gaps.
pub struct Supervisor<C: Clock> {
    pub workflow_id: WorkflowId,
    pub ctx: AgentContext<C>,
    pub executor: Executor,
    pub cancel: CancellationToken,
}

impl<C: Clock> Supervisor<C> {
    /// Run the Architect phase only, stopping at the approval gate (spec
    /// §4.4: `start_workflow`/`queue_and_plan_workflow` without an external
    /// plan).
    pub async fn run_planning(&self, issue: IssueBrief) -> Outcome {
        self.emit_stage_started(Stage::Architect).await;

        let result = self
            .run_cancellable(backoff::retry_transient(
                DEFAULT_MAX_ATTEMPTS,
                is_transient_runner_error,
                || self.run_drained(|sink| architect::run(&self.ctx, &issue, sink)),
            ))
            .await;

        match result {
            PhaseResult::Cancelled => Outcome::Cancelled,
            PhaseResult::Done(Ok(_plan)) => {
                self.emit_stage_completed(Stage::Architect).await;
                Outcome::AwaitingApproval
            }
            PhaseResult::Done(Err(err)) => {
                self.emit_stage_failed(Stage::Architect, &err).await;
                Outcome::Failed { reason: err.to_string() }
            }
        }
    }

    /// Run Developer → Reviewer → optional revision cycles against an
    /// already-approved or externally-supplied plan (spec §4.4, §4.6).
    pub async fn run_execution(&self, mut plan: TaskPlan) -> Outcome {
        let max_iterations = self.ctx.profile.max_review_iterations.max(1);

        for iteration in 0..max_iterations {
            self.emit_stage_started(Stage::Developer).await;
            let developer_result = self
                .run_cancellable(backoff::retry_transient(
                    DEFAULT_MAX_ATTEMPTS,
                    is_transient_runner_error,
                    || self.run_drained(|sink| developer::run(&self.ctx, &plan, sink)),
                ))
                .await;

            match developer_result {
                PhaseResult::Cancelled => return Outcome::Cancelled,
                PhaseResult::Done(Err(err)) => {
                    self.emit_stage_failed(Stage::Developer, &err).await;
                    return Outcome::Failed { reason: err.to_string() };
                }
                PhaseResult::Done(Ok(())) => self.emit_stage_completed(Stage::Developer).await,
            }

            self.emit_stage_started(Stage::Reviewer).await;
            let review_result = self
                .run_cancellable(backoff::retry_transient(
                    DEFAULT_MAX_ATTEMPTS,
                    is_transient_runner_error,
                    || self.run_drained(|sink| reviewer::run(&self.ctx, &plan, sink)),
                ))
                .await;

            let outcome = match review_result {
                PhaseResult::Cancelled => return Outcome::Cancelled,
                PhaseResult::Done(Err(err)) => {
                    self.emit_stage_failed(Stage::Reviewer, &err).await;
                    return Outcome::Failed { reason: err.to_string() };
                }
                PhaseResult::Done(Ok(outcome)) => outcome,
            };
            self.emit_stage_completed(Stage::Reviewer).await;

            match outcome {
                ReviewOutcome::Approved { .. } => return Outcome::Completed,
                ReviewOutcome::Rejected { feedback } => {
                    let has_more_iterations = iteration + 1 < max_iterations;
                    if self.ctx.profile.auto_approve_reviews && has_more_iterations {
                        // Fall through to another Developer/Reviewer cycle,
                        // re-running the whole plan's remaining (non-
                        // completed) tasks against the reviewer's feedback.
                        plan = Self::apply_feedback(plan, &feedback);
                        continue;
                    }
                    return Outcome::NeedsConfirmation { feedback };
                }
            }
        }

        Outcome::NeedsConfirmation {
            feedback: "max review iterations reached without approval".to_string(),
        }
    }

    /// Re-open every non-completed task so a revision cycle re-runs them
    /// against the reviewer's feedback, folding the feedback into each
    /// task's description the way a human would paste review comments back
    /// into a follow-up prompt.
    fn apply_feedback(mut plan: TaskPlan, feedback: &str) -> TaskPlan {
        for task in &mut plan.tasks {
            if task.status != amelia_core::TaskStatus::Completed {
                task.status = amelia_core::TaskStatus::Pending;
            }
            task.description = format!("{}\n\nReviewer feedback from a prior attempt: {feedback}", task.description);
        }
        plan
    }

    /// Race `fut` against the cancellation token, so a cancelled workflow
    /// unwinds at the call's await point rather than running to completion
    /// (spec §4.4 step 5, §5 "Cancellation").
    async fn run_cancellable<T>(&self, fut: impl std::future::Future<Output = T>) -> PhaseResult<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => PhaseResult::Cancelled,
            result = fut => PhaseResult::Done(result),
        }
    }

    /// Run one runner function, draining the [`Effect`]s it emits through
    /// [`Executor`] as they arrive rather than batching until the runner
    /// returns — this is what makes `agent_output` events reach WebSocket
    /// subscribers live instead of only after a whole phase finishes.
    async fn run_drained<T, Fut>(&self, run: impl FnOnce(&EffectSink) -> Fut) -> Result<T, AgentRunnerError>
    where
        Fut: std::future::Future<Output = Result<T, AgentRunnerError>>,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Effect>();
        let sink = EffectSink::new(tx);
        let executor = self.executor.clone();
        let workflow_id = self.workflow_id;
        let drain = tokio::spawn(async move {
            while let Some(effect) = rx.recv().await {
                if let Err(err) = executor.perform(workflow_id, effect).await {
                    tracing::warn!(workflow_id = %workflow_id, error = %err, "failed to apply runner effect");
                }
            }
        });

        let result = run(&sink).await;
        drop(sink);
        let _ = drain.await;
        result
    }

    async fn emit(&self, event_type: EventType, message: impl Into<String>) {
        self.emit_event(Event::new(self.workflow_id, event_type, message, self.ctx.clock.epoch_ms())).await;
    }

    async fn emit_event(&self, event: Event) {
        if let Err(err) = self.executor.perform(self.workflow_id, Effect::EmitEvent(event)).await {
            tracing::warn!(workflow_id = %self.workflow_id, error = %err, "failed to persist scheduler event");
        }
    }

    async fn emit_stage_started(&self, stage: Stage) {
        self.emit(EventType::StageStarted, format!("{stage} started")).await;
    }

    async fn emit_stage_completed(&self, stage: Stage) {
        self.emit(EventType::StageCompleted, format!("{stage} completed")).await;
    }

    /// The closed event-type enum (spec §6) has no dedicated `stage_failed`
    /// variant, so a failed stage is still reported as `StageCompleted` —
    /// but with `is_error` set, so consumers can tell the two apart.
    async fn emit_stage_failed(&self, stage: Stage, err: &AgentRunnerError) {
        let event = Event::new(
            self.workflow_id,
            EventType::StageCompleted,
            format!("{stage} failed: {err}"),
            self.ctx.clock.epoch_ms(),
        )
        .as_error();
        self.emit_event(event).await;
    }
}

enum PhaseResult<T> {
    Cancelled,
    Done(T),
}

/// Only a driver-level timeout/transport hiccup is worth retrying (spec §7
/// "Transient inside a phase → retry with backoff"); a malformed plan or
/// verdict is a logic error retrying the same prompt won't fix.
fn is_transient_runner_error(err: &AgentRunnerError) -> bool {
    matches!(err, AgentRunnerError::Driver(driver_err) if driver_err.is_transient())
}

/// Whether `WorkflowStatus::InProgress` is reachable from `status` without
/// passing back through `Pending` — used by the scheduler to decide whether
/// a resumed supervisor should start at [`Supervisor::run_planning`] or
/// [`Supervisor::run_execution`].
pub fn resumes_at_execution(status: WorkflowStatus) -> bool {
    matches!(status, WorkflowStatus::InProgress | WorkflowStatus::Blocked)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
