// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use crate::test_support::{test_bus, test_store};
use amelia_agents::Effect;
use amelia_core::{test_support as core_fixtures, Clock, Event, EventType, FakeClock, TaskStatus, WorkflowRepository};
use tempfile::tempdir;

fn setup() -> (tempfile::TempDir, Executor, amelia_core::WorkflowId) {
    let dir = tempdir().expect("tempdir");
    let store = test_store(dir.path());
    let workflow_id = amelia_core::WorkflowId::new();
    store.create(amelia_core::Workflow::builder().id(workflow_id).build()).expect("create workflow");
    let bus = test_bus(Arc::clone(&store));
    (dir, Executor::new(store, bus), workflow_id)
}

#[tokio::test]
async fn emit_event_persists_and_assigns_a_sequence() {
    let (_dir, executor, workflow_id) = setup();
    let clock = FakeClock::new();
    let event = Event::new(workflow_id, EventType::AgentOutput, "hello", clock.epoch_ms());

    executor.perform(workflow_id, Effect::EmitEvent(event)).await.expect("perform");

    let stored = EventRepository::list(&executor.store, workflow_id, None, None).expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sequence, 1);
}

#[tokio::test]
async fn write_task_plan_then_update_task_status_round_trips() {
    let (_dir, executor, workflow_id) = setup();
    let plan = core_fixtures::test_task_plan();
    let task_id = plan.tasks[0].id;

    executor.perform(workflow_id, Effect::WriteTaskPlan(plan)).await.expect("write plan");
    executor
        .perform(workflow_id, Effect::UpdateTaskStatus { task_id, status: TaskStatus::Completed })
        .await
        .expect("update status");

    let stored = TaskPlanRepository::get(&executor.store, workflow_id).expect("get plan").expect("plan present");
    let task = stored.tasks.iter().find(|t| t.id == task_id).expect("task present");
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn set_plan_path_updates_the_stored_workflow() {
    let (_dir, executor, workflow_id) = setup();
    let path = std::path::PathBuf::from("/tmp/plan.md");

    executor.perform(workflow_id, Effect::SetPlanPath(path.clone())).await.expect("perform");

    let workflow = WorkflowRepository::get(&executor.store, workflow_id).expect("get").expect("present");
    assert_eq!(workflow.plan_path, Some(path));
}

#[tokio::test]
async fn update_task_status_without_a_plan_fails() {
    let (_dir, executor, workflow_id) = setup();
    let result = executor
        .perform(workflow_id, Effect::UpdateTaskStatus { task_id: amelia_core::TaskId::new(), status: TaskStatus::Completed })
        .await;
    assert!(result.is_err());
}
