// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! HTTP API-based driver (spec §4.5, §9 "Driver plurality").
//!
//! Talks to an LLM completions API directly over `reqwest`, the way the
//! teacher's `RemoteCoopClient` talks to a remote coop over bearer-token
//! HTTP (`daemon/adapters/agent/remote.rs`) — same shape (registry-free,
//! token in every request, timeout wrapping every call), but against a real
//! public API rather than a loopback sidecar, so this driver reaches for
//! `reqwest` instead of hand-rolling HTTP/1.1 framing over a raw socket.

use crate::{
    AgenticMessage, AgenticRequest, AgenticStream, Driver, DriverError, GenerateRequest,
    GenerateResult, SchemaError, SessionId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio_stream::StreamExt;
use tokio_util::io::StreamReader;
use tracing::Instrument;

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<&'a str>,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    content: String,
    #[serde(default)]
    structured: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct AgenticBody<'a> {
    prompt: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

/// HTTP API-based driver implementation.
#[derive(Clone)]
pub struct ApiDriver {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl ApiDriver {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl Driver for ApiDriver {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResult, DriverError> {
        let span = tracing::info_span!("driver.generate", driver = "api", model = %request.model);
        async move {
            let body = GenerateBody {
                prompt: &request.prompt,
                system_prompt: request.system_prompt.as_deref(),
                model: &request.model,
                schema: request.schema.as_ref(),
            };

            let response = tokio::time::timeout(
                self.request_timeout,
                self.authed(self.client.post(format!("{}/v1/generate", self.base_url)).json(&body))
                    .send(),
            )
            .await
            .map_err(|_| DriverError::Timeout)?
            .map_err(|e| DriverError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(DriverError::Refusal(format!("{status}: {body}")));
            }

            let parsed: GenerateResponse =
                response.json().await.map_err(|e| DriverError::Protocol(e.to_string()))?;

            let structured = match (&request.schema, parsed.structured) {
                (Some(_), Some(value)) => Some(value),
                (Some(_), None) => return Err(SchemaError::Missing.into()),
                (None, value) => value,
            };

            Ok(GenerateResult { content: parsed.content, structured })
        }
        .instrument(span)
        .await
    }

    async fn execute_agentic(&self, request: AgenticRequest) -> Result<AgenticStream, DriverError> {
        let span = tracing::info_span!(
            "driver.execute_agentic",
            driver = "api",
            resumed = request.session_id.is_some(),
        );
        async move {
            let session_id_str = request.session_id.map(|s| s.as_str().to_string());
            let body = AgenticBody {
                prompt: &request.prompt,
                model: &request.model,
                session_id: session_id_str.as_deref(),
                instructions: request.instructions.as_deref(),
            };

            let response = self
                .authed(
                    self.client.post(format!("{}/v1/agentic/stream", self.base_url)).json(&body),
                )
                .send()
                .await
                .map_err(|e| DriverError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(DriverError::Refusal(format!("{status}: {body}")));
            }

            let byte_stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));
            let reader = StreamReader::new(byte_stream);
            let mut lines = tokio::io::BufReader::new(reader).lines();

            let (tx, rx) = tokio::sync::mpsc::channel(64);
            tokio::spawn(
                async move {
                    loop {
                        match lines.next_line().await {
                            Ok(Some(line)) => {
                                if line.trim().is_empty() {
                                    continue;
                                }
                                let parsed = serde_json::from_str::<AgenticMessage>(&line)
                                    .map_err(|e| DriverError::Protocol(e.to_string()));
                                let terminal = matches!(&parsed, Ok(msg) if msg.is_terminal());
                                let is_err = parsed.is_err();
                                if tx.send(parsed).await.is_err() {
                                    break;
                                }
                                if terminal || is_err {
                                    break;
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                let _ = tx.send(Err(DriverError::Transport(e.to_string()))).await;
                                break;
                            }
                        }
                    }
                }
                .in_current_span(),
            );

            Ok(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)) as AgenticStream)
        }
        .instrument(span)
        .await
    }

    async fn cleanup_session(&self, session_id: SessionId) {
        let url = format!("{}/v1/sessions/{}/cleanup", self.base_url, session_id.as_str());
        if let Err(err) = self.authed(self.client.post(url)).send().await {
            tracing::debug!(%session_id, error = %err, "best-effort session cleanup failed");
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
