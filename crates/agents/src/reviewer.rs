// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The Reviewer: critiques the Developer's diff against the plan (spec §4.6).
//!
//! Obtains the diff through the driver's shell tool (`git diff HEAD`) rather
//! than inspecting the worktree directly, keeping this crate filesystem-free
//! outside of the Architect's plan-markdown write. Revision-cycle and
//! approval-gate decisions based on the returned [`ReviewOutcome`] belong to
//! the scheduler (spec §4.4/§4.6 `auto_approve_reviews`, `max_review_iterations`).

use crate::{AgentContext, AgentRunnerError, Effect, EffectSink};
use amelia_core::{AgentRole, Clock, Event, EventType, TaskPlan};
use amelia_driver::{AgenticMessage, AgenticRequest, GenerateRequest};
use tokio_stream::StreamExt;

#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Approved { feedback: Option<String> },
    Rejected { feedback: String },
}

fn verdict_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["approved"],
        "properties": {
            "approved": {"type": "boolean"},
            "feedback": {"type": "string"},
        },
    })
}

#[derive(Debug, serde::Deserialize)]
struct VerdictDraft {
    approved: bool,
    #[serde(default)]
    feedback: Option<String>,
}

/// Run the Reviewer phase, returning the verdict on the current diff.
pub async fn run(
    ctx: &AgentContext<impl Clock>,
    plan: &TaskPlan,
    sink: &EffectSink,
) -> Result<ReviewOutcome, AgentRunnerError> {
    let model = ctx.model_for(AgentRole::Reviewer).to_string();
    let diff_request = AgenticRequest::new(
        "Run `git diff HEAD` using the shell tool and report the full output verbatim.",
        ctx.worktree_path.clone(),
        model.clone(),
    );
    let mut stream = ctx.driver.execute_agentic(diff_request).await?;

    let mut diff = String::new();
    while let Some(message) = stream.next().await {
        let message = message?;
        if ctx.stream_tool_results {
            crate::output::emit_agent_output(ctx, sink, "reviewer", &message);
        }
        match &message {
            AgenticMessage::ToolResult { tool_output, is_error: false, .. } => {
                diff = tool_output.clone();
            }
            AgenticMessage::Result { content, .. } if diff.is_empty() => {
                diff = content.clone();
            }
            _ => {}
        }
    }

    let judge_prompt = format!(
        "Review this diff against the stated goal \"{goal}\" and report whether it satisfies \
         the plan. Diff:\n\n{diff}",
        goal = plan.goal,
    );
    let generated = ctx
        .driver
        .generate(GenerateRequest::new(judge_prompt, model).with_schema(verdict_schema()))
        .await?;
    let structured = generated
        .structured
        .ok_or_else(|| AgentRunnerError::MalformedVerdict("no structured payload returned".into()))?;
    let draft: VerdictDraft = serde_json::from_value(structured)
        .map_err(|e| AgentRunnerError::MalformedVerdict(e.to_string()))?;

    let outcome = if draft.approved {
        ReviewOutcome::Approved { feedback: draft.feedback }
    } else {
        ReviewOutcome::Rejected {
            feedback: draft.feedback.unwrap_or_else(|| "no feedback provided".to_string()),
        }
    };

    sink.emit(Effect::EmitEvent(
        Event::new(ctx.workflow_id, EventType::ReviewSubmitted, "review submitted", ctx.clock.epoch_ms())
            .with_agent("reviewer")
            .with_data(serde_json::json!({
                "approved": matches!(&outcome, ReviewOutcome::Approved { .. }),
            })),
    ));

    Ok(outcome)
}

#[cfg(test)]
#[path = "reviewer_tests.rs"]
mod tests;
