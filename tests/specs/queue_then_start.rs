// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 1 (spec §8): queue a workflow without starting it, then start it
//! and watch it leave `pending`.

use crate::prelude::{ensure_profile, wait_for, Server, SPEC_WAIT_MAX_MS};

#[tokio::test]
async fn queue_then_start_leaves_pending_state() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;

    let create = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": "X-1",
                "worktree_path": server.worktree("a"),
                "profile": profile_id,
                "start": false,
            }),
        )
        .await;
    assert_eq!(create.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = create.json().await.expect("create response");
    let workflow_id = body["workflow_id"].as_str().expect("workflow_id").to_string();

    assert_eq!(server.workflow_status(&workflow_id).await, "pending");

    let start = server.post(&format!("/api/workflows/{workflow_id}/start")).await;
    assert_eq!(start.status(), reqwest::StatusCode::ACCEPTED);

    let reached = wait_for(SPEC_WAIT_MAX_MS, || async {
        matches!(server.workflow_status(&workflow_id).await.as_str(), "planning" | "in_progress" | "blocked" | "completed")
    })
    .await;
    assert!(reached, "workflow should have left pending within the wait budget");
}
