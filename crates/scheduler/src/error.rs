// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Crate-local error type, folded into [`amelia_core::AmeliaError`] at the
//! admission-op boundary (spec §7), the same pattern every other crate here
//! uses.

use amelia_core::AmeliaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Core(#[from] AmeliaError),
    #[error("workflow {0} not found")]
    WorkflowNotFound(amelia_core::WorkflowId),
    #[error("workflow {id} is {status}, expected {expected}")]
    WrongState { id: amelia_core::WorkflowId, status: amelia_core::WorkflowStatus, expected: &'static str },
    #[error("worktree {0} is already in use by another workflow")]
    WorktreeConflict(std::path::PathBuf),
    #[error("at the concurrency limit of {0} in-progress workflows")]
    ConcurrencyLimit(u32),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Agent(#[from] amelia_agents::AgentRunnerError),
}

impl From<SchedulerError> for AmeliaError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Core(inner) => inner,
            SchedulerError::WorkflowNotFound(_) => AmeliaError::not_found(err.to_string()),
            SchedulerError::WrongState { .. } => AmeliaError::wrong_state(err.to_string()),
            SchedulerError::WorktreeConflict(_) => AmeliaError::worktree_conflict(err.to_string()),
            SchedulerError::ConcurrencyLimit(_) => AmeliaError::concurrency_limit(err.to_string()),
            SchedulerError::Validation(message) => AmeliaError::validation(message),
            SchedulerError::Agent(inner) => inner.into(),
        }
    }
}
