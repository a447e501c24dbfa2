// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Per-workflow, per-model token accounting rows (spec §3).
//!
//! Consumed only by reporting; the orchestrator core writes rows and never
//! reads them back (spec §3 "TokenUsage").

use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUsageRow {
    pub workflow_id: WorkflowId,
    pub model: String,
    pub timestamp_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub duration_ms: u64,
}
