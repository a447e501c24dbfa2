// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The Developer: iterates the Architect's task plan (spec §4.6).
//!
//! Already-`Completed` tasks are skipped, so a retried phase (after a
//! transient failure, per the scheduler's backoff) resumes rather than
//! redoing finished work. Artifacts are never parsed beyond detecting
//! `write_file`-style tool calls (spec §4.6 "used elsewhere" — token usage
//! and reporting, not this crate).

use crate::{AgentContext, AgentRunnerError, Effect, EffectSink};
use amelia_core::{AgentRole, Clock, Event, EventType, TaskPlan, TaskStatus};
use amelia_driver::{AgenticMessage, AgenticRequest};
use tokio_stream::StreamExt;

/// Run the Developer phase over `plan`'s tasks in dependency order.
///
/// Stops at the first task that fails, leaving every task up to and
/// including it reflected in emitted [`Effect::UpdateTaskStatus`]s — the
/// caller decides whether to retry (resuming past the completed prefix) or
/// fail the workflow.
pub async fn run(
    ctx: &AgentContext<impl Clock>,
    plan: &TaskPlan,
    sink: &EffectSink,
) -> Result<(), AgentRunnerError> {
    let order = plan.execution_order()?;
    let model = ctx.model_for(AgentRole::Developer).to_string();

    for task_id in order {
        let task = plan
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .expect("execution_order only returns ids present in plan.tasks");
        if matches!(task.status, TaskStatus::Completed) {
            continue;
        }

        sink.emit(Effect::UpdateTaskStatus { task_id, status: TaskStatus::InProgress });
        sink.emit(Effect::EmitEvent(
            Event::new(ctx.workflow_id, EventType::TaskStarted, task.description.clone(), ctx.clock.epoch_ms())
                .with_agent("developer")
                .with_data(serde_json::json!({"task_id": task_id})),
        ));

        let request = AgenticRequest::new(task.description.clone(), ctx.worktree_path.clone(), model.clone());
        match execute_task(ctx, sink, request).await {
            Ok(()) => {
                sink.emit(Effect::UpdateTaskStatus { task_id, status: TaskStatus::Completed });
                sink.emit(Effect::EmitEvent(
                    Event::new(
                        ctx.workflow_id,
                        EventType::TaskCompleted,
                        task.description.clone(),
                        ctx.clock.epoch_ms(),
                    )
                    .with_agent("developer")
                    .with_data(serde_json::json!({"task_id": task_id})),
                ));
            }
            Err(err) => {
                sink.emit(Effect::UpdateTaskStatus { task_id, status: TaskStatus::Failed });
                sink.emit(Effect::EmitEvent(
                    Event::new(ctx.workflow_id, EventType::TaskFailed, err.to_string(), ctx.clock.epoch_ms())
                        .with_agent("developer")
                        .with_data(serde_json::json!({"task_id": task_id}))
                        .as_error(),
                ));
                return Err(err);
            }
        }
    }
    Ok(())
}

async fn execute_task(
    ctx: &AgentContext<impl Clock>,
    sink: &EffectSink,
    request: AgenticRequest,
) -> Result<(), AgentRunnerError> {
    let mut stream = ctx.driver.execute_agentic(request).await?;
    // Tracks whether the message immediately preceding the terminal `result`
    // was an erroring tool result (spec §4.5 "Guarantees": failure ends with
    // a terminal `tool_result{is_error=true}` followed by `result`).
    let mut pending_error: Option<String> = None;

    while let Some(message) = stream.next().await {
        let message = message?;

        if let Some((_, tool_input)) = message.as_write_file_call() {
            sink.emit(Effect::EmitEvent(
                Event::new(ctx.workflow_id, EventType::AgentOutput, "write_file", ctx.clock.epoch_ms())
                    .with_agent("developer")
                    .with_data(tool_input.clone()),
            ));
        } else if ctx.stream_tool_results {
            crate::output::emit_agent_output(ctx, sink, "developer", &message);
        }

        match &message {
            AgenticMessage::ToolResult { tool_output, is_error: true, .. } => {
                pending_error = Some(tool_output.clone());
            }
            AgenticMessage::Result { .. } => {}
            _ => pending_error = None,
        }
    }

    match pending_error {
        Some(tool_output) => Err(AgentRunnerError::TaskFailed(tool_output)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "developer_tests.rs"]
mod tests;
