// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use amelia_core::test_support::{fake_clock, test_profile};
use amelia_core::{AgentProfileConfig, DriverKind, WorkflowId};
use amelia_driver::cli::CliDriver;

fn test_context() -> AgentContext<amelia_core::FakeClock> {
    let mut profile = test_profile();
    profile.architect = AgentProfileConfig::new(DriverKind::Cli, "architect-model");
    profile.architect.phase_timeout_seconds = Some(60);

    AgentContext {
        workflow_id: WorkflowId::new(),
        worktree_path: "/tmp/worktree".into(),
        worktree_name: "worktree".to_string(),
        issue_id: "ISS-1".to_string(),
        profile,
        driver: std::sync::Arc::new(CliDriver::new("fake-cli")),
        clock: fake_clock(),
        stream_tool_results: true,
    }
}

#[test]
fn model_for_reads_the_matching_role_config() {
    let ctx = test_context();
    assert_eq!(ctx.model_for(AgentRole::Architect), "architect-model");
    assert_eq!(ctx.model_for(AgentRole::Developer), "test-model");
}

#[test]
fn phase_timeout_uses_the_override_when_present() {
    let ctx = test_context();
    assert_eq!(ctx.phase_timeout(AgentRole::Architect), std::time::Duration::from_secs(60));
}

#[test]
fn phase_timeout_falls_back_to_the_default() {
    let ctx = test_context();
    assert_eq!(ctx.phase_timeout(AgentRole::Developer), std::time::Duration::from_secs(1800));
}
