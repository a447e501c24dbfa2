// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Named execution configuration binding agent roles to drivers/models (spec §3).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Identifier for a stored [`Profile`].
    pub struct ProfileId("prf-");
}

/// Which concrete [driver](../amelia_driver/index.html) backend an agent role
/// uses. The core only knows the kind tag; `amelia-driver` resolves it to a
/// concrete implementation (spec §4.5, §9 "Driver plurality").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// Subprocess-wrapping CLI driver.
    Cli,
    /// HTTP API-based driver.
    Api,
}

crate::simple_display! {
    DriverKind {
        Cli => "cli",
        Api => "api",
    }
}

/// Which pipeline role a sub-config belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Architect,
    Developer,
    Reviewer,
}

crate::simple_display! {
    AgentRole {
        Architect => "architect",
        Developer => "developer",
        Reviewer => "reviewer",
    }
}

/// Per-agent execution knobs within a [`Profile`] (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfileConfig {
    pub driver_kind: DriverKind,
    pub model: String,
    /// Architect-only: the model used for the structured-extraction
    /// validation pass (spec §4.6). Ignored by other roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_model: Option<String>,
    /// Reviewer-only: cap on revision cycles (spec §4.6, §4.4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
    /// Per-phase timeout override; falls back to the server default
    /// (spec §5, SPEC_FULL §3) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_timeout_seconds: Option<u64>,
}

impl AgentProfileConfig {
    pub fn new(driver_kind: DriverKind, model: impl Into<String>) -> Self {
        Self {
            driver_kind,
            model: model.into(),
            validator_model: None,
            max_iterations: None,
            phase_timeout_seconds: None,
        }
    }
}

/// Named execution configuration (spec §3). Shared by reference from
/// `Workflow::profile_id`; mutating a profile never retroactively changes a
/// workflow already created against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub architect: AgentProfileConfig,
    pub developer: AgentProfileConfig,
    pub reviewer: AgentProfileConfig,
    pub tracker: Option<String>,
    pub working_dir: PathBuf,
    pub plan_output_dir: PathBuf,
    pub plan_path_pattern: String,
    pub auto_approve_reviews: bool,
    pub max_review_iterations: u32,
    pub is_active: bool,
}

impl Profile {
    pub fn config_for(&self, role: AgentRole) -> &AgentProfileConfig {
        match role {
            AgentRole::Architect => &self.architect,
            AgentRole::Developer => &self.developer,
            AgentRole::Reviewer => &self.reviewer,
        }
    }
}

crate::builder! {
    pub struct ProfileBuilder => Profile {
        into {
            name: String = "default",
        }
        set {
            id: ProfileId = ProfileId::new(),
            architect: AgentProfileConfig = AgentProfileConfig::new(DriverKind::Cli, "default-model"),
            developer: AgentProfileConfig = AgentProfileConfig::new(DriverKind::Cli, "default-model"),
            reviewer: AgentProfileConfig = AgentProfileConfig::new(DriverKind::Cli, "default-model"),
            working_dir: PathBuf = PathBuf::from("."),
            plan_output_dir: PathBuf = PathBuf::from("./plans"),
            plan_path_pattern: String = "{worktree_name}/{issue_id}.md".to_string(),
            auto_approve_reviews: bool = false,
            max_review_iterations: u32 = 3,
            is_active: bool = true,
        }
        option {
            tracker: String = None,
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
