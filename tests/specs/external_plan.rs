// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 3 (spec §8): importing an external plan at creation time skips
//! the Architect phase entirely and goes straight to Developer on start.

use crate::prelude::{ensure_profile, wait_for, Server, SPEC_WAIT_MAX_MS};

#[tokio::test]
async fn external_plan_skips_architect_phase() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;

    let plan_content = "# Plan\n\ngoal: ship the requested change\n\n- [ ] implement the change\n";
    let create = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": "X-3",
                "worktree_path": server.worktree("external"),
                "profile": profile_id,
                "start": false,
                "plan_content": plan_content,
            }),
        )
        .await;
    assert_eq!(create.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = create.json().await.expect("create response");
    let workflow_id = body["workflow_id"].as_str().expect("workflow_id").to_string();

    let detail: serde_json::Value = server.get(&format!("/api/workflows/{workflow_id}")).await.json().await.expect("detail");
    assert_eq!(detail["status"], "pending");
    assert_eq!(detail["external_plan"], true);
    assert!(detail["planned_at_ms"].is_number(), "planned_at_ms should be set at creation");

    let start = server.post(&format!("/api/workflows/{workflow_id}/start")).await;
    assert_eq!(start.status(), reqwest::StatusCode::ACCEPTED);

    // Never visits `planning` (the Architect phase is skipped); it should
    // move directly into the Developer/Reviewer execution loop.
    let reached = wait_for(SPEC_WAIT_MAX_MS, || async {
        matches!(server.workflow_status(&workflow_id).await.as_str(), "in_progress" | "blocked" | "completed")
    })
    .await;
    assert!(reached, "workflow with an external plan should start executing directly");
    assert_ne!(server.workflow_status(&workflow_id).await, "planning");
}
