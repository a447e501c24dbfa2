// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Checkpointed restart (spec §4.4, §9 "Restart semantics — open question").
//!
//! These tests build a scheduler, drive workflows into the states a
//! mid-flight process would have left them in, then construct a *second*
//! scheduler over the same store and call [`Scheduler::resume_from_checkpoint`]
//! on it — mirroring how a real restart re-reads the WAL into a fresh
//! process rather than reusing the original scheduler's in-memory maps.

use super::*;
use crate::request::CreateWorkflowRequest;
use crate::test_support::{test_bus, test_store};
use amelia_agents::FakeDriver;
use amelia_core::{
    test_support as core_fixtures, DriverKind, FakeClock, ProfileRepository, SettingsPatch, SettingsRepository,
};
use amelia_driver::{AgenticMessage, Driver, DriverFactory, GenerateResult};
use std::sync::Arc;
use tempfile::TempDir;

struct SingleDriverFactory(Arc<FakeDriver>);

impl DriverFactory for SingleDriverFactory {
    fn driver_for(&self, _kind: DriverKind) -> Arc<dyn Driver> {
        Arc::clone(&self.0) as Arc<dyn Driver>
    }
}

fn build_scheduler(
    store: Arc<amelia_storage::Store>,
    driver: Arc<FakeDriver>,
) -> Arc<Scheduler<FakeClock>> {
    let bus = test_bus(Arc::clone(&store));
    let driver_factory = Arc::new(SingleDriverFactory(driver));
    Arc::new(Scheduler::new(store, bus, driver_factory, FakeClock::new()).expect("construct scheduler"))
}

/// Creates a store with default (fail-on-restart) settings, an active
/// profile, and one pending workflow admitted and left `in_progress`
/// (architect already resolved, blocked on nothing) by pushing it straight
/// past planning via an external plan.
async fn seed_in_progress_workflow(store_dir: &std::path::Path) -> (Arc<amelia_storage::Store>, Arc<FakeDriver>, amelia_core::WorkflowId, TempDir) {
    let store = test_store(store_dir);
    SettingsRepository::ensure_defaults(&*store).expect("ensure defaults");

    let mut profile = core_fixtures::test_profile();
    profile.plan_output_dir = store_dir.join("plans");
    let profile_id = profile.id;
    ProfileRepository::create(&*store, profile).expect("create profile");
    ProfileRepository::set_active(&*store, profile_id).expect("activate profile");

    let driver = Arc::new(FakeDriver::new());
    let scheduler = build_scheduler(Arc::clone(&store), Arc::clone(&driver));

    let worktree = tempfile::tempdir().expect("worktree tempdir");
    driver.push_agentic(vec![Ok(AgenticMessage::Result { content: "a plan".to_string(), session_id: None })]);
    driver.push_generate(Ok(GenerateResult {
        content: String::new(),
        structured: Some(serde_json::json!({
            "goal": "ship it",
            "key_files": [],
            "tasks": [{"description": "do the work", "dependencies": []}],
        })),
    }));

    let id = scheduler
        .start_workflow(CreateWorkflowRequest::new("ISS-1", worktree.path().to_path_buf()))
        .await
        .expect("start");

    // Wait for the architect to finish and the workflow to reach the
    // approval gate.
    for _ in 0..200 {
        if scheduler.get_workflow(id).expect("get").status == WorkflowStatus::Blocked {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let mut workflow = scheduler.get_workflow(id).expect("get");
    assert_eq!(workflow.status, WorkflowStatus::Blocked, "fixture setup expects the architect to reach the gate");

    // Force it into `in_progress` directly rather than going through
    // `approve_plan` (which would spawn a real execution task we'd then
    // have to race against) — restart tests care about what
    // `resume_from_checkpoint` does with a *durably persisted* status, not
    // how it got there.
    workflow.transition(WorkflowStatus::InProgress).expect("blocked -> in_progress is legal");
    WorkflowRepository::update(&*store, workflow.clone()).expect("force in_progress");

    (store, driver, id, worktree)
}

#[tokio::test]
async fn default_settings_fail_in_flight_workflows_on_restart() {
    let dir = tempfile::tempdir().expect("store dir");
    let (store, driver, id, _worktree) = seed_in_progress_workflow(dir.path()).await;

    // Fresh scheduler over the same store, as a restarted process would build.
    let restarted = build_scheduler(Arc::clone(&store), driver);
    restarted.resume_from_checkpoint().await.expect("resume");

    let workflow = WorkflowRepository::get(&*store, id).expect("get").expect("exists");
    assert_eq!(workflow.status, WorkflowStatus::Failed);
    assert_eq!(workflow.failure_reason.as_deref(), Some("orchestrator_restart"));
    assert!(!restarted.slots.is_occupied(&workflow.worktree_path));

    let events = EventRepository::list(&*store, id, None, None).expect("events");
    assert!(events.iter().any(|e| e.event_type == amelia_core::EventType::WorkflowFailed && e.is_error));
}

#[tokio::test]
async fn positive_retention_resumes_an_in_progress_workflow() {
    let dir = tempfile::tempdir().expect("store dir");
    let (store, driver, id, worktree) = seed_in_progress_workflow(dir.path()).await;
    SettingsRepository::update(&*store, SettingsPatch { checkpoint_retention_days: Some(7), ..Default::default() })
        .expect("enable resume");

    // The resumed execution task runs Developer -> Reviewer against the
    // plan already on disk; queue enough driver output for it to complete.
    driver.push_agentic(vec![Ok(AgenticMessage::Result { content: "done".to_string(), session_id: None })]);
    driver.push_agentic(vec![Ok(AgenticMessage::ToolResult {
        tool_call_id: "1".to_string(),
        tool_output: "diff --git a/src/lib.rs".to_string(),
        is_error: false,
    })]);
    driver.push_generate(Ok(GenerateResult {
        content: String::new(),
        structured: Some(serde_json::json!({"approved": true})),
    }));

    let restarted = build_scheduler(Arc::clone(&store), driver);
    restarted.resume_from_checkpoint().await.expect("resume");

    for _ in 0..200 {
        if WorkflowRepository::get(&*store, id).expect("get").expect("exists").status.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let workflow = WorkflowRepository::get(&*store, id).expect("get").expect("exists");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    let _ = worktree;
}

#[tokio::test]
async fn blocked_workflows_reoccupy_their_slot_without_resuming_under_either_policy() {
    let dir = tempfile::tempdir().expect("store dir");
    let store = test_store(dir.path());
    SettingsRepository::ensure_defaults(&*store).expect("ensure defaults");
    let mut profile = core_fixtures::test_profile();
    profile.plan_output_dir = dir.path().join("plans");
    let profile_id = profile.id;
    ProfileRepository::create(&*store, profile).expect("create profile");
    ProfileRepository::set_active(&*store, profile_id).expect("activate profile");

    let driver = Arc::new(FakeDriver::new());
    let scheduler = build_scheduler(Arc::clone(&store), Arc::clone(&driver));
    let worktree = tempfile::tempdir().expect("worktree tempdir");
    driver.push_agentic(vec![Ok(AgenticMessage::Result { content: "a plan".to_string(), session_id: None })]);
    driver.push_generate(Ok(GenerateResult {
        content: String::new(),
        structured: Some(serde_json::json!({"goal": "g", "key_files": [], "tasks": [{"description": "t", "dependencies": []}]})),
    }));
    let id = scheduler
        .start_workflow(CreateWorkflowRequest::new("ISS-1", worktree.path().to_path_buf()))
        .await
        .expect("start");
    for _ in 0..200 {
        if scheduler.get_workflow(id).expect("get").status == WorkflowStatus::Blocked {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(scheduler.get_workflow(id).expect("get").status, WorkflowStatus::Blocked);

    let restarted = build_scheduler(Arc::clone(&store), driver);
    restarted.resume_from_checkpoint().await.expect("resume");

    // Blocked workflows never had an execution task to lose, so they stay
    // blocked (and keep the worktree slot per invariant §3.1) regardless of
    // the restart-resume setting.
    let workflow = WorkflowRepository::get(&*store, id).expect("get").expect("exists");
    assert_eq!(workflow.status, WorkflowStatus::Blocked);
    assert!(restarted.slots.is_occupied(worktree.path()));
}
