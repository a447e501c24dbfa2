// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Crate-local error type, folded into [`amelia_core::AmeliaError`] at the
//! agent-runner boundary (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("driver returned no structured payload for a schema-constrained request")]
    Missing,
    #[error("structured payload did not match the requested schema: {0}")]
    Mismatch(String),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver operation timed out")]
    Timeout,
    #[error("subprocess error: {0}")]
    Process(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("driver refused the request: {0}")]
    Refusal(String),
}

impl DriverError {
    /// Whether the scheduler's per-phase retry loop should treat this as
    /// transient (spec §4.4 step 4, §7).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transport(_))
    }
}

impl From<DriverError> for amelia_core::AmeliaError {
    fn from(err: DriverError) -> Self {
        if err.is_transient() {
            amelia_core::AmeliaError::transient(err.to_string())
        } else {
            amelia_core::AmeliaError::driver(err.to_string())
        }
    }
}
