// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The state half of "stateless function over driver+state" (spec §4.6,
//! GLOSSARY "Agent"). Runners read from this; they never write to it —
//! progress is reported through [`crate::EffectSink`] instead.

use amelia_core::{AgentRole, Clock, Profile, WorkflowId};
use amelia_driver::Driver;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a runner needs about the workflow it's executing a phase for.
pub struct AgentContext<C: Clock> {
    pub workflow_id: WorkflowId,
    pub worktree_path: PathBuf,
    pub worktree_name: String,
    pub issue_id: String,
    pub profile: Profile,
    pub driver: Arc<dyn Driver>,
    pub clock: C,
    /// Mirrors `ServerSettings.stream_tool_results` (spec §3): when `false`,
    /// runners still persist `agent_output` events but skip emitting them
    /// eagerly, since nothing live is meant to see them.
    pub stream_tool_results: bool,
}

impl<C: Clock> AgentContext<C> {
    pub fn model_for(&self, role: AgentRole) -> &str {
        &self.profile.config_for(role).model
    }

    pub fn phase_timeout(&self, role: AgentRole) -> std::time::Duration {
        let seconds = self.profile.config_for(role).phase_timeout_seconds.unwrap_or(1800);
        std::time::Duration::from_secs(seconds)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
