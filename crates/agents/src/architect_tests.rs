// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use crate::fake_driver::FakeDriver;
use crate::Driver;
use amelia_core::test_support::{fake_clock, test_profile};
use amelia_core::WorkflowId;
use amelia_driver::GenerateResult;
use std::sync::Arc;
use tokio::sync::mpsc;

fn test_context(
    plan_output_dir: std::path::PathBuf,
    driver: Arc<dyn Driver>,
) -> AgentContext<amelia_core::FakeClock> {
    let mut profile = test_profile();
    profile.plan_output_dir = plan_output_dir;

    AgentContext {
        workflow_id: WorkflowId::new(),
        worktree_path: "/tmp/worktree".into(),
        worktree_name: "worktree".to_string(),
        issue_id: "ISS-1".to_string(),
        profile,
        driver,
        clock: fake_clock(),
        stream_tool_results: true,
    }
}

#[tokio::test]
async fn run_writes_plan_markdown_and_emits_effects() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeDriver::new();
    fake.push_agentic(vec![Ok(AgenticMessage::Result {
        content: "discussed the plan".to_string(),
        session_id: None,
    })]);
    fake.push_generate(Ok(GenerateResult {
        content: "{}".to_string(),
        structured: Some(serde_json::json!({
            "goal": "ship the feature",
            "key_files": ["src/lib.rs"],
            "tasks": [
                {"description": "implement the change", "dependencies": []},
                {"description": "add tests", "dependencies": [0]},
            ],
        })),
    }));
    let ctx = test_context(dir.path().to_path_buf(), Arc::new(fake));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = EffectSink::new(tx);
    let issue = IssueBrief::new("ISS-1").with_title("Ship it");

    let plan = run(&ctx, &issue, &sink).await.unwrap();

    assert_eq!(plan.goal, "ship the feature");
    assert_eq!(plan.tasks.len(), 2);
    assert_eq!(plan.tasks[1].dependencies, vec![plan.tasks[0].id]);

    let plan_path = ctx.profile.plan_output_dir.join("worktree/ISS-1.md");
    let markdown = tokio::fs::read_to_string(&plan_path).await.unwrap();
    assert!(markdown.contains("ship the feature"));

    let mut effects = Vec::new();
    while let Ok(effect) = rx.try_recv() {
        effects.push(effect);
    }
    assert!(matches!(&effects[0], Effect::WriteTaskPlan(p) if p.goal == "ship the feature"));
    assert!(matches!(&effects[1], Effect::SetPlanPath(p) if p == &plan_path));
    assert!(matches!(&effects[2], Effect::EmitEvent(e) if e.event_type == EventType::PlanCompleted));
}

#[tokio::test]
async fn run_rejects_a_plan_with_an_out_of_range_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeDriver::new();
    fake.push_agentic(vec![Ok(AgenticMessage::Result { content: "discussion".to_string(), session_id: None })]);
    fake.push_generate(Ok(GenerateResult {
        content: "{}".to_string(),
        structured: Some(serde_json::json!({
            "goal": "ship it",
            "tasks": [{"description": "do the thing", "dependencies": [5]}],
        })),
    }));
    let ctx = test_context(dir.path().to_path_buf(), Arc::new(fake));

    let (tx, _rx) = mpsc::unbounded_channel();
    let sink = EffectSink::new(tx);
    let issue = IssueBrief::new("ISS-1");

    let err = run(&ctx, &issue, &sink).await.unwrap_err();
    assert!(matches!(err, AgentRunnerError::MalformedPlan(_)));
}

#[tokio::test]
async fn run_fails_when_generate_returns_no_structured_payload() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeDriver::new();
    fake.push_agentic(vec![Ok(AgenticMessage::Result { content: "discussion".to_string(), session_id: None })]);
    fake.push_generate(Ok(GenerateResult { content: "no json here".to_string(), structured: None }));
    let ctx = test_context(dir.path().to_path_buf(), Arc::new(fake));

    let (tx, _rx) = mpsc::unbounded_channel();
    let sink = EffectSink::new(tx);
    let issue = IssueBrief::new("ISS-1");

    let err = run(&ctx, &issue, &sink).await.unwrap_err();
    assert!(matches!(err, AgentRunnerError::MalformedPlan(_)));
}
