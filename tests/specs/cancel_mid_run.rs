// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 6 (spec §8): cancelling a running workflow moves it to
//! `cancelled` and frees its worktree slot for another workflow to claim.

use crate::prelude::{ensure_profile, wait_for, Server, SPEC_WAIT_MAX_MS};

#[tokio::test]
async fn cancel_frees_the_worktree_slot() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;
    let worktree = server.worktree("cancel-me");

    let create = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": "X-6",
                "worktree_path": &worktree,
                "profile": &profile_id,
                "start": true,
            }),
        )
        .await;
    assert_eq!(create.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = create.json().await.expect("create response");
    let workflow_id = body["workflow_id"].as_str().expect("workflow_id").to_string();

    let holding = wait_for(SPEC_WAIT_MAX_MS, || async {
        matches!(server.workflow_status(&workflow_id).await.as_str(), "planning" | "in_progress" | "blocked")
    })
    .await;
    assert!(holding, "workflow should be holding the worktree before we cancel it");

    let cancel = server.post(&format!("/api/workflows/{workflow_id}/cancel")).await;
    assert_eq!(cancel.status(), reqwest::StatusCode::ACCEPTED);

    let cancelled = wait_for(SPEC_WAIT_MAX_MS, || async { server.workflow_status(&workflow_id).await == "cancelled" }).await;
    assert!(cancelled, "workflow should reach cancelled within the phase-cancellation budget");

    // Cancelling again is idempotent and still just 202s.
    let cancel_again = server.post(&format!("/api/workflows/{workflow_id}/cancel")).await;
    assert_eq!(cancel_again.status(), reqwest::StatusCode::ACCEPTED);

    // The worktree slot is free: a fresh pending workflow on the same path
    // can now be started without a conflict.
    let second = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": "X-6b",
                "worktree_path": &worktree,
                "profile": &profile_id,
                "start": true,
            }),
        )
        .await;
    assert_eq!(second.status(), reqwest::StatusCode::CREATED);
}
