// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 4 (spec §8): batch-starting two pending workflows that share a
//! worktree starts exactly one and reports the other as a conflict.

use crate::prelude::{ensure_profile, Server};

#[tokio::test]
async fn batch_start_reports_partial_success_on_worktree_conflict() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;
    let worktree = server.worktree("batch");

    let mut ids = Vec::new();
    for issue_id in ["X-4a", "X-4b"] {
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
        ids.push(body["workflow_id"].as_str().expect("workflow_id").to_string());
    }

    let batch = server.post_json("/api/workflows/start-batch", serde_json::json!({})).await;
    assert_eq!(batch.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = batch.json().await.expect("batch response");

    let started = body["started"].as_array().expect("started array");
    assert_eq!(started.len(), 1, "only one workflow should win the worktree slot");
    let started_id = started[0].as_str().expect("started id");
    assert!(ids.contains(&started_id.to_string()));

    let errors = body["errors"].as_object().expect("errors object");
    assert_eq!(errors.len(), 1);
    let (loser_id, reason) = errors.iter().next().expect("one error entry");
    assert_ne!(loser_id, started_id);
    assert!(ids.contains(loser_id));
    assert!(
        reason.as_str().expect("reason string").to_lowercase().contains("worktree"),
        "error reason should mention the worktree conflict, got {reason}"
    );
}
