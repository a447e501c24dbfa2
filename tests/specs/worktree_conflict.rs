// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 2 (spec §8): starting a second pending workflow on a worktree
//! already held by another running workflow is rejected with `409
//! WorktreeConflict`, and the rejected workflow stays `pending`.

use crate::prelude::{ensure_profile, wait_for, Server, SPEC_WAIT_MAX_MS};

async fn create_pending(server: &Server, profile_id: &str, issue_id: &str, worktree: &std::path::Path) -> String {
    let resp = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": issue_id,
                "worktree_path": worktree,
                "profile": profile_id,
                "start": false,
            }),
        )
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = resp.json().await.expect("create response");
    body["workflow_id"].as_str().expect("workflow_id").to_string()
}

#[tokio::test]
async fn second_start_on_same_worktree_is_rejected() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;
    let worktree = server.worktree("shared");

    let first = create_pending(&server, &profile_id, "X-1", &worktree).await;
    let second = create_pending(&server, &profile_id, "X-2", &worktree).await;

    let start_first = server.post(&format!("/api/workflows/{first}/start")).await;
    assert_eq!(start_first.status(), reqwest::StatusCode::ACCEPTED);

    let holding = wait_for(SPEC_WAIT_MAX_MS, || async {
        matches!(server.workflow_status(&first).await.as_str(), "planning" | "in_progress" | "blocked")
    })
    .await;
    assert!(holding, "first workflow should be holding the worktree slot");

    let start_second = server.post(&format!("/api/workflows/{second}/start")).await;
    assert_eq!(start_second.status(), reqwest::StatusCode::CONFLICT);
    let body: serde_json::Value = start_second.json().await.expect("error body");
    assert_eq!(body["error"]["kind"], "worktree_conflict");

    assert_eq!(server.workflow_status(&second).await, "pending");
}
