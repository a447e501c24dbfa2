// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Crate-local error type, folded into [`amelia_core::AmeliaError`] at the
//! scheduler boundary (spec §7), the same pattern `amelia-driver::DriverError`
//! uses.

use amelia_core::TaskPlanError;
use amelia_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentRunnerError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("plan dependency graph is invalid: {0}")]
    InvalidPlan(#[from] TaskPlanError),
    #[error("plan response did not match the expected schema: {0}")]
    MalformedPlan(String),
    #[error("failed to write plan file: {0}")]
    Io(#[from] std::io::Error),
    #[error("reviewer verdict did not match the expected schema: {0}")]
    MalformedVerdict(String),
    #[error("developer task reported a terminal tool error: {0}")]
    TaskFailed(String),
}

impl From<AgentRunnerError> for amelia_core::AmeliaError {
    fn from(err: AgentRunnerError) -> Self {
        match err {
            AgentRunnerError::Driver(driver_err) => driver_err.into(),
            other => amelia_core::AmeliaError::driver(other.to_string()),
        }
    }
}
