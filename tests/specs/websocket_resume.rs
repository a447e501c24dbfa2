// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Scenario 5 (spec §8): a client that disconnects mid-stream and
//! reconnects with `since_sequence` sees the remainder of the event log
//! exactly once, in order, no gaps and no duplicates.

use crate::prelude::{ensure_profile, Server};
use tokio_stream::StreamExt;
use tokio_tungstenite::tungstenite::Message as WsMessage;

async fn next_event(
    stream: &mut (impl StreamExt<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> amelia_core::Event {
    loop {
        let message = tokio::time::timeout(std::time::Duration::from_secs(2), stream.next())
            .await
            .expect("no message before timeout")
            .expect("stream ended")
            .expect("websocket error");
        if let WsMessage::Text(text) = message {
            let value: serde_json::Value = serde_json::from_str(&text).expect("event json");
            if value.get("type").and_then(|t| t.as_str()) == Some("heartbeat") {
                continue;
            }
            return serde_json::from_value(value).expect("event shape");
        }
    }
}

#[tokio::test]
async fn reconnect_with_since_sequence_continues_without_gaps_or_duplicates() {
    let server = Server::start().await;
    let profile_id = ensure_profile(&server).await;

    let create = server
        .post_json(
            "/api/workflows",
            serde_json::json!({
                "issue_id": "X-5",
                "worktree_path": server.worktree("resume"),
                "profile": profile_id,
                "start": true,
            }),
        )
        .await;
    let body: serde_json::Value = create.json().await.expect("create response");
    let workflow_id = body["workflow_id"].as_str().expect("workflow_id").to_string();

    let ws_url = server.url("").replacen("http://", "ws://", 1);
    let first_url = format!("{ws_url}/ws/events?workflow_id={workflow_id}");
    let (mut first, _) = tokio_tungstenite::connect_async(first_url).await.expect("connect");

    let mut seen = Vec::new();
    while seen.len() < 2 {
        seen.push(next_event(&mut first).await);
    }
    drop(first);

    let checkpoint = seen.last().expect("at least one event").sequence;
    for pair in seen.windows(2) {
        assert_eq!(pair[1].sequence, pair[0].sequence + 1, "live-tail sequence should be gapless");
    }

    let resume_url = format!("{ws_url}/ws/events?workflow_id={workflow_id}&since_sequence={checkpoint}");
    let (mut second, _) = tokio_tungstenite::connect_async(resume_url).await.expect("reconnect");

    let mut resumed = Vec::new();
    while resumed.len() < 2 {
        resumed.push(next_event(&mut second).await);
    }

    for event in &resumed {
        assert!(event.sequence > checkpoint, "resumed stream must never replay already-seen sequences");
    }
    for pair in resumed.windows(2) {
        assert_eq!(pair[1].sequence, pair[0].sequence + 1, "resumed stream should be gapless");
    }
}
