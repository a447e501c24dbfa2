// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Request/response and streamed-message shapes for the [`crate::Driver`]
//! contract (spec §4.5).

use crate::SessionId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A one-shot completion request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// JSON Schema the driver should constrain (or validate) its output
    /// against. When present, [`GenerateResult::structured`] is populated.
    pub schema: Option<serde_json::Value>,
    pub model: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), system_prompt: None, schema: None, model: model.into() }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub content: String,
    pub structured: Option<serde_json::Value>,
}

/// A multi-step tool-using run request (spec §4.5).
#[derive(Debug, Clone)]
pub struct AgenticRequest {
    pub prompt: String,
    pub cwd: PathBuf,
    /// Threads conversational continuity across invocations.
    pub session_id: Option<SessionId>,
    pub instructions: Option<String>,
    pub model: String,
}

impl AgenticRequest {
    pub fn new(prompt: impl Into<String>, cwd: PathBuf, model: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), cwd, session_id: None, instructions: None, model: model.into() }
    }

    pub fn resuming(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// One typed message in an `execute_agentic` stream (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgenticMessage {
    Thinking {
        content: String,
    },
    ToolCall {
        tool_name: String,
        tool_input: serde_json::Value,
        tool_call_id: String,
    },
    ToolResult {
        tool_call_id: String,
        tool_output: String,
        is_error: bool,
    },
    Result {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
    },
}

impl AgenticMessage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. })
    }

    /// Detects artifact-producing tool calls the Developer runner tracks
    /// without otherwise parsing tool output (spec §4.6 "Developer").
    pub fn as_write_file_call(&self) -> Option<(&str, &serde_json::Value)> {
        match self {
            Self::ToolCall { tool_name, tool_input, .. } if tool_name == "write_file" => {
                Some((tool_name, tool_input))
            }
            _ => None,
        }
    }
}
