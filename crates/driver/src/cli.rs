// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Subprocess-wrapping driver (spec §4.5, §9 "Driver plurality").
//!
//! Wraps an external coding-agent CLI the way the teacher's `LocalAdapter`
//! wraps a coop sidecar process (`daemon/adapters/agent/coop/adapter.rs`):
//! one subprocess per agentic run, a registry keyed by session id so a
//! resumed call can be matched back to its process group, and a kill path
//! that goes through a graceful signal before forcing. Unlike coop, there is
//! no long-lived sidecar to dial over a socket — each `execute_agentic` call
//! spawns, streams, and (on completion) reaps its own child, so the CLI tool
//! is expected to support a `--resume <session-id>` style flag for
//! conversational continuity instead of an attached long-running process.

use crate::{
    AgenticMessage, AgenticRequest, AgenticStream, Driver, DriverError, GenerateRequest,
    GenerateResult, SchemaError, SessionId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

/// One line of the CLI tool's `--output-format stream-json` protocol. Kept
/// separate from [`AgenticMessage`] because the wire shape is the external
/// tool's contract, not ours; [`CliDriver`] translates between them.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CliLine {
    Thinking { content: String },
    ToolCall { tool_name: String, tool_input: serde_json::Value, tool_call_id: String },
    ToolResult { tool_call_id: String, tool_output: String, #[serde(default)] is_error: bool },
    Result { content: String, #[serde(default)] session_id: Option<String> },
}

impl From<CliLine> for AgenticMessage {
    fn from(line: CliLine) -> Self {
        match line {
            CliLine::Thinking { content } => AgenticMessage::Thinking { content },
            CliLine::ToolCall { tool_name, tool_input, tool_call_id } => {
                AgenticMessage::ToolCall { tool_name, tool_input, tool_call_id }
            }
            CliLine::ToolResult { tool_call_id, tool_output, is_error } => {
                AgenticMessage::ToolResult { tool_call_id, tool_output, is_error }
            }
            CliLine::Result { content, session_id } => {
                AgenticMessage::Result { content, session_id: session_id.map(SessionId::from_string) }
            }
        }
    }
}

/// A registered, still-running subprocess, kept so [`CliDriver::cleanup_session`]
/// can find and kill it.
struct RunningProcess {
    child: Mutex<Option<Child>>,
}

/// Subprocess-wrapping driver implementation.
#[derive(Clone)]
pub struct CliDriver {
    /// Path or name of the CLI binary to invoke (e.g. `"amelia-agent-cli"`).
    binary: Arc<str>,
    processes: Arc<Mutex<HashMap<SessionId, Arc<RunningProcess>>>>,
    /// Wall-clock bound on a one-shot `generate` call.
    generate_timeout: Duration,
}

impl CliDriver {
    pub fn new(binary: impl Into<Arc<str>>) -> Self {
        Self {
            binary: binary.into(),
            processes: Arc::new(Mutex::new(HashMap::new())),
            generate_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }
}

#[async_trait]
impl Driver for CliDriver {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResult, DriverError> {
        let span = tracing::info_span!("driver.generate", driver = "cli", model = %request.model);
        async move {
            let mut cmd = Command::new(self.binary.as_ref());
            cmd.arg("generate").arg("--model").arg(&request.model);
            if let Some(system) = &request.system_prompt {
                cmd.arg("--system").arg(system);
            }
            if request.schema.is_some() {
                cmd.arg("--json-schema");
            }
            cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

            let mut child =
                cmd.spawn().map_err(|e| DriverError::Process(format!("spawn failed: {e}")))?;
            {
                let mut stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| DriverError::Process("no stdin handle".into()))?;
                stdin
                    .write_all(request.prompt.as_bytes())
                    .await
                    .map_err(|e| DriverError::Process(format!("write failed: {e}")))?;
            }

            let output = tokio::time::timeout(self.generate_timeout, child.wait_with_output())
                .await
                .map_err(|_| DriverError::Timeout)?
                .map_err(|e| DriverError::Process(format!("wait failed: {e}")))?;

            if !output.status.success() {
                return Err(DriverError::Process(format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                )));
            }

            let content = String::from_utf8_lossy(&output.stdout).into_owned();
            let structured = if request.schema.is_some() {
                let value: serde_json::Value = serde_json::from_str(&content)
                    .map_err(|e| SchemaError::Mismatch(e.to_string()))?;
                Some(value)
            } else {
                None
            };
            Ok(GenerateResult { content, structured })
        }
        .instrument(span)
        .await
    }

    async fn execute_agentic(&self, request: AgenticRequest) -> Result<AgenticStream, DriverError> {
        let span = tracing::info_span!(
            "driver.execute_agentic",
            driver = "cli",
            cwd = %request.cwd.display(),
            resumed = request.session_id.is_some(),
        );
        async move {
            let mut cmd = Command::new(self.binary.as_ref());
            cmd.arg("run")
                .arg("--output-format")
                .arg("stream-json")
                .arg("--model")
                .arg(&request.model)
                .current_dir(&request.cwd);
            if let Some(session_id) = request.session_id {
                cmd.arg("--resume").arg(session_id.as_str());
            }
            if let Some(instructions) = &request.instructions {
                cmd.arg("--instructions").arg(instructions);
            }
            cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());

            let mut child =
                cmd.spawn().map_err(|e| DriverError::Process(format!("spawn failed: {e}")))?;
            {
                let mut stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| DriverError::Process("no stdin handle".into()))?;
                stdin
                    .write_all(request.prompt.as_bytes())
                    .await
                    .map_err(|e| DriverError::Process(format!("write failed: {e}")))?;
            }
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| DriverError::Process("no stdout handle".into()))?;

            let session_key = request.session_id.unwrap_or_else(SessionId::new);
            self.processes
                .lock()
                .insert(session_key, Arc::new(RunningProcess { child: Mutex::new(Some(child)) }));

            let (tx, rx) = mpsc::channel(64);
            let processes = Arc::clone(&self.processes);
            tokio::spawn(
                async move {
                    let mut lines = BufReader::new(stdout).lines();
                    loop {
                        match lines.next_line().await {
                            Ok(Some(line)) => {
                                if line.trim().is_empty() {
                                    continue;
                                }
                                let parsed = serde_json::from_str::<CliLine>(&line)
                                    .map(AgenticMessage::from)
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
                                let _ = tx.send(Err(DriverError::Protocol(e.to_string()))).await;
                                break;
                            }
                        }
                    }
                    processes.lock().remove(&session_key);
                }
                .in_current_span(),
            );

            Ok(Box::pin(ReceiverStream::new(rx)) as AgenticStream)
        }
        .instrument(span)
        .await
    }

    async fn cleanup_session(&self, session_id: SessionId) {
        let Some(proc) = self.processes.lock().remove(&session_id) else { return };
        if let Some(mut child) = proc.child.lock().take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
