// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Singleton server settings (spec §3). Everything here is mutated only
//! through the API or CLI — never a bootstrap flag (spec §6, SPEC_FULL §1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Upper bound on simultaneous `in_progress` workflows (spec §4.4).
    pub max_concurrent: u32,
    /// Idle duration before a WebSocket connection receives a heartbeat
    /// frame (spec §4.7).
    pub websocket_idle_timeout_seconds: u64,
    /// Bounds the initial admission handshake (spec §5).
    pub workflow_start_timeout_seconds: u64,
    /// When `stream_tool_results` is false, `agent_output` events carrying
    /// tool results are persisted but not fanned out live (reporting-only).
    pub stream_tool_results: bool,
    /// Number of days of terminal workflows/events to retain before pruning
    /// (out of scope for this core, consumed by a retention job elsewhere);
    /// `0` also governs the restart-resume-vs-fail decision (spec §4.4,
    /// §9, SPEC_FULL §3): `0` means "fail and report" on restart.
    pub checkpoint_retention_days: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            websocket_idle_timeout_seconds: 30,
            workflow_start_timeout_seconds: 30,
            stream_tool_results: true,
            checkpoint_retention_days: 0,
        }
    }
}

impl ServerSettings {
    /// Whether a non-terminal non-`pending` workflow found at startup should
    /// be resumed from its last checkpoint rather than failed
    /// (spec §4.4 "Checkpointed restart").
    pub fn resumes_on_restart(&self) -> bool {
        self.checkpoint_retention_days > 0
    }
}
