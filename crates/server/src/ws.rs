// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! WebSocket Broadcaster (spec §4.7, C7): `GET /ws/events?workflow_id=&since_sequence=`.
//! Each connection owns one bus [`Subscription`]; idle connections receive a
//! heartbeat frame, and a subscription the bus has dropped for falling
//! behind closes with a `slow_consumer` code rather than leaving the client
//! guessing (spec §4.2 "slowest-subscriber policy").
//!
//! Grounded in the teacher's sibling repo's `WebSocketUpgrade` handler
//! pattern (`golemcloud-golem/cloud-debugging-service/src/websocket.rs`):
//! a single `on_upgrade` closure driving one `tokio::select!` loop per
//! connection — generalized here to fan out bus events instead of handling
//! JSON-RPC requests, since this broadcaster is server-push only.

use crate::app::App;
use amelia_bus::{Subscription, SubscriptionFilter};
use amelia_core::WorkflowId;
use amelia_storage::SettingsRepository;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;

/// Non-standard but in the private-use range (RFC 6455 §7.4.2 reserves
/// 3000-3999 for libraries/frameworks); there's no assigned code for
/// "server dropped you for being too slow".
const SLOW_CONSUMER_CLOSE_CODE: u16 = 3001;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub workflow_id: Option<WorkflowId>,
    pub since_sequence: Option<u64>,
}

pub async fn handle(
    ws: WebSocketUpgrade,
    State(app): State<App>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let filter = match query.workflow_id {
        Some(id) => SubscriptionFilter::Workflow(id),
        None => SubscriptionFilter::All,
    };
    let subscription = app.bus.subscribe(filter, query.since_sequence);
    let idle_timeout = SettingsRepository::get(&*app.store)
        .map(|settings| Duration::from_secs(settings.websocket_idle_timeout_seconds))
        .unwrap_or(Duration::from_secs(30));

    ws.on_upgrade(move |socket| stream_events(socket, subscription, idle_timeout))
}

async fn stream_events(mut socket: WebSocket, mut subscription: Subscription, idle_timeout: Duration) {
    loop {
        tokio::select! {
            event = subscription.recv() => {
                match event {
                    Some(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::warn!(error = %err, "failed to serialize event for websocket");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("websocket subscription dropped, closing as slow_consumer");
                        let close_frame = CloseFrame {
                            code: SLOW_CONSUMER_CLOSE_CODE,
                            reason: Cow::from("slow_consumer"),
                        };
                        let _ = socket.send(Message::Close(Some(close_frame))).await;
                        break;
                    }
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            _ = tokio::time::sleep(idle_timeout) => {
                if socket.send(Message::Text(r#"{"type":"heartbeat"}"#.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
