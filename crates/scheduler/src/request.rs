// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Request/result shapes for the admission operations in spec §4.4's table.
//! `amelia-server` builds these from the HTTP bodies in spec §6; this crate
//! never parses JSON itself.

use amelia_core::{ProfileId, WorkflowId};
use std::path::PathBuf;

/// Where an external plan's content comes from (spec §6 `plan_file`/`plan_content`,
/// mutually exclusive). Parsing the file (or markdown structure within the
/// content) is out of scope for the core (spec §1 "markdown parsing of
/// plans/design docs" is a named external collaborator) — both variants
/// resolve to a single opaque plan body string the scheduler wraps in a
/// one-task [`amelia_core::TaskPlan`] (see DESIGN.md).
#[derive(Debug, Clone)]
pub enum ExternalPlanSource {
    File(PathBuf),
    Content(String),
}

/// Body shared by every workflow-creation admission op (spec §4.4
/// `start_workflow`/`queue_workflow`/`queue_and_plan_workflow`, spec §6
/// `POST /api/workflows`).
#[derive(Debug, Clone)]
pub struct CreateWorkflowRequest {
    pub issue_id: String,
    pub worktree_path: PathBuf,
    pub worktree_name: Option<String>,
    pub profile_id: Option<ProfileId>,
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    /// Set only for the external-plan-at-creation path (spec §3 invariant 4,
    /// §8 scenario 3). `queue_and_plan_workflow` never carries one — its
    /// whole point is to generate a plan, not import one.
    pub external_plan: Option<ExternalPlanSource>,
}

impl CreateWorkflowRequest {
    pub fn new(issue_id: impl Into<String>, worktree_path: impl Into<PathBuf>) -> Self {
        Self {
            issue_id: issue_id.into(),
            worktree_path: worktree_path.into(),
            worktree_name: None,
            profile_id: None,
            task_title: None,
            task_description: None,
            external_plan: None,
        }
    }

    pub fn with_worktree_name(mut self, name: impl Into<String>) -> Self {
        self.worktree_name = Some(name.into());
        self
    }

    pub fn with_profile_id(mut self, id: ProfileId) -> Self {
        self.profile_id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task_title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = Some(description.into());
        self
    }

    pub fn with_external_plan(mut self, source: ExternalPlanSource) -> Self {
        self.external_plan = Some(source);
        self
    }
}

/// Body for `set_external_plan` (spec §4.4, §6 `POST /api/workflows/{id}/plan`).
#[derive(Debug, Clone)]
pub struct SetExternalPlanRequest {
    pub source: ExternalPlanSource,
    /// Overwrite an existing plan (spec §4.4 precondition "(plan absent OR force)").
    pub force: bool,
}

/// Which pending workflows `start_batch_workflows` should attempt (spec §4.4,
/// §6 `POST /api/workflows/start-batch` body `{workflow_ids?, worktree_path?}`).
#[derive(Debug, Clone)]
pub enum BatchSelector {
    WorkflowIds(Vec<WorkflowId>),
    Worktree(PathBuf),
    /// No filter: every currently pending workflow is a candidate.
    AllPending,
}

/// Result of `start_batch_workflows` (spec §6 `{started[], errors{id:reason}}`).
/// `errors` keeps insertion order rather than using a `HashMap` so the
/// tie-break described in spec §4.4 ("only the first is admitted") is visible
/// in the order callers see results, not just in which one happened to win.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub started: Vec<WorkflowId>,
    pub errors: Vec<(WorkflowId, String)>,
}
