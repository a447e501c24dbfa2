// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Shared test fixtures exported behind the `test-support` feature so
//! downstream crates (`amelia-storage`, `amelia-scheduler`, ...) can build
//! valid domain values without duplicating construction logic in every
//! crate's dev-dependencies.

use crate::clock::FakeClock;
use crate::profile::{AgentProfileConfig, AgentRole, DriverKind, Profile};
use crate::task_plan::{Task, TaskPlan};
use crate::workflow::Workflow;
use std::path::PathBuf;

pub fn fake_clock() -> FakeClock {
    FakeClock::new()
}

pub fn test_profile() -> Profile {
    Profile::builder()
        .name("test-profile")
        .architect(AgentProfileConfig::new(DriverKind::Cli, "test-model"))
        .developer(AgentProfileConfig::new(DriverKind::Cli, "test-model"))
        .reviewer(AgentProfileConfig::new(DriverKind::Cli, "test-model"))
        .build()
}

pub fn test_workflow(worktree_path: impl Into<PathBuf>) -> Workflow {
    Workflow::builder().worktree_path(worktree_path.into()).build()
}

pub fn test_task_plan() -> TaskPlan {
    let a = Task::new("implement the change");
    let a_id = a.id;
    let b = Task::new("add tests").depends_on(a_id);
    TaskPlan::new("ship the feature", vec!["src/lib.rs".to_string()], vec![a, b])
}

pub fn architect_role() -> AgentRole {
    AgentRole::Architect
}
