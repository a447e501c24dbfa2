// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The Architect: plan generator + validator (spec §4.6).
//!
//! Calls `execute_agentic` with a planning prompt, then a second
//! `generate(schema=...)` pass to extract a structured [`TaskPlan`] from the
//! conversation, the same two-call "free-form then structured-extraction"
//! shape the teacher's coop adapter uses when a tool's natural output isn't
//! already the shape a caller needs. `stage_started`/`stage_completed` are
//! emitted by the scheduler around every phase, uniformly; this runner only
//! emits the events that are Architect-specific.

use crate::{AgentContext, AgentRunnerError, Effect, EffectSink, IssueBrief};
use amelia_core::{AgentRole, Event, EventType, Task, TaskId, TaskPlan};
use amelia_driver::{AgenticMessage, AgenticRequest, GenerateRequest};
use tokio_stream::StreamExt;

fn planning_prompt(issue: &IssueBrief) -> String {
    let title = issue.task_title.as_deref().unwrap_or(issue.issue_id.as_str());
    let description = issue.task_description.as_deref().unwrap_or("(no description provided)");
    format!(
        "You are planning the implementation of issue {issue_id}: {title}.\n\n\
         Description:\n{description}\n\n\
         Explore the repository as needed, then describe a goal, the key files involved, \
         and an ordered list of developer tasks with their dependencies.",
        issue_id = issue.issue_id,
        title = title,
        description = description,
    )
}

fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["goal", "tasks"],
        "properties": {
            "goal": {"type": "string"},
            "key_files": {"type": "array", "items": {"type": "string"}},
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["description"],
                    "properties": {
                        "description": {"type": "string"},
                        "dependencies": {"type": "array", "items": {"type": "integer"}},
                    },
                },
            },
        },
    })
}

#[derive(Debug, serde::Deserialize)]
struct TaskDraft {
    description: String,
    #[serde(default)]
    dependencies: Vec<usize>,
}

#[derive(Debug, serde::Deserialize)]
struct PlanDraft {
    goal: String,
    #[serde(default)]
    key_files: Vec<String>,
    tasks: Vec<TaskDraft>,
}

fn build_plan(draft: PlanDraft) -> Result<TaskPlan, AgentRunnerError> {
    let mut tasks: Vec<Task> = draft.tasks.iter().map(|d| Task::new(d.description.clone())).collect();
    let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();

    for (i, draft_task) in draft.tasks.iter().enumerate() {
        for &dep_index in &draft_task.dependencies {
            let dep_id = *ids.get(dep_index).ok_or_else(|| {
                AgentRunnerError::MalformedPlan(format!(
                    "task {i} depends on out-of-range index {dep_index}"
                ))
            })?;
            tasks[i].dependencies.push(dep_id);
        }
    }

    let plan = TaskPlan::new(draft.goal, draft.key_files, tasks);
    // Validates the dependency graph is a DAG (spec §3 invariant); propagates
    // as `AgentRunnerError::InvalidPlan` on a cycle or dangling reference.
    plan.execution_order()?;
    Ok(plan)
}

/// Render the plan as markdown for `plan_path` (spec §4.6 "Writes plan
/// markdown to plan_path").
fn render_markdown(issue: &IssueBrief, plan: &TaskPlan) -> String {
    let mut out = format!("# Plan for {}\n\n## Goal\n\n{}\n\n", issue.issue_id, plan.goal);
    if !plan.key_files.is_empty() {
        out.push_str("## Key files\n\n");
        for file in &plan.key_files {
            out.push_str(&format!("- {file}\n"));
        }
        out.push('\n');
    }
    out.push_str("## Tasks\n\n");
    for (i, task) in plan.tasks.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, task.description));
    }
    out
}

fn plan_output_path(ctx: &AgentContext<impl amelia_core::Clock>, issue: &IssueBrief) -> std::path::PathBuf {
    let relative = ctx
        .profile
        .plan_path_pattern
        .replace("{worktree_name}", &ctx.worktree_name)
        .replace("{issue_id}", &issue.issue_id);
    ctx.profile.plan_output_dir.join(relative)
}

/// Run the Architect phase, returning the validated plan on success.
pub async fn run(
    ctx: &AgentContext<impl amelia_core::Clock>,
    issue: &IssueBrief,
    sink: &EffectSink,
) -> Result<TaskPlan, AgentRunnerError> {
    let model = ctx.model_for(AgentRole::Architect).to_string();
    let prompt = planning_prompt(issue);

    let request = AgenticRequest::new(prompt, ctx.worktree_path.clone(), model.clone())
        .with_instructions("Plan only; do not make any code changes yet.");
    let mut stream = ctx.driver.execute_agentic(request).await?;

    let mut transcript = String::new();
    while let Some(message) = stream.next().await {
        let message = message?;
        if ctx.stream_tool_results {
            crate::output::emit_agent_output(ctx, sink, "architect", &message);
        }
        match &message {
            AgenticMessage::Result { content, .. } => transcript.push_str(content),
            AgenticMessage::Thinking { content } => transcript.push_str(content),
            _ => {}
        }
    }

    let validator_model = ctx
        .profile
        .architect
        .validator_model
        .clone()
        .unwrap_or(model);
    let extraction_prompt = format!(
        "Extract a structured task plan from the following planning discussion:\n\n{transcript}"
    );
    let generated = ctx
        .driver
        .generate(GenerateRequest::new(extraction_prompt, validator_model).with_schema(plan_schema()))
        .await?;
    let structured = generated
        .structured
        .ok_or_else(|| AgentRunnerError::MalformedPlan("no structured payload returned".into()))?;
    let draft: PlanDraft = serde_json::from_value(structured)
        .map_err(|e| AgentRunnerError::MalformedPlan(e.to_string()))?;
    let plan = build_plan(draft)?;

    let markdown = render_markdown(issue, &plan);
    let path = plan_output_path(ctx, issue);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, markdown).await?;

    sink.emit(Effect::WriteTaskPlan(plan.clone()));
    sink.emit(Effect::SetPlanPath(path));
    sink.emit(Effect::EmitEvent(
        Event::new(ctx.workflow_id, EventType::PlanCompleted, "plan completed", ctx.clock.epoch_ms())
            .with_agent("architect")
            .with_data(serde_json::json!({"goal": plan.goal, "task_count": plan.tasks.len()})),
    ));

    Ok(plan)
}

#[cfg(test)]
#[path = "architect_tests.rs"]
mod tests;
