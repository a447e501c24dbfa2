// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Workflow CRUD, admission, and approval endpoints (spec §6).

use crate::app::App;
use crate::error::ApiError;
use amelia_core::{AmeliaError, Event, ProfileId, TaskPlan, Workflow, WorkflowId, WorkflowStatus};
use amelia_scheduler::{BatchSelector, CreateWorkflowRequest, ExternalPlanSource, SetExternalPlanRequest};
use amelia_storage::{EventRepository, TaskPlanRepository, WorkflowFilter, WorkflowRepository};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recent events returned inline with a workflow's detail view (spec §6
/// `GET /api/workflows/{id}` "last N events"); large enough to show a
/// session's worth of activity without requiring a second round trip.
const DETAIL_EVENT_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub issue_id: String,
    pub worktree_path: PathBuf,
    pub worktree_name: String,
    pub status: WorkflowStatus,
    pub current_stage: Option<amelia_core::Stage>,
    pub created_at_ms: u64,
}

impl From<Workflow> for WorkflowSummary {
    fn from(w: Workflow) -> Self {
        Self {
            id: w.id,
            issue_id: w.issue_id,
            worktree_path: w.worktree_path,
            worktree_name: w.worktree_name,
            status: w.status,
            current_stage: w.current_stage,
            created_at_ms: w.created_at_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub plan: Option<TaskPlan>,
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct ListWorkflowsQuery {
    pub status: Option<WorkflowStatus>,
    pub worktree: Option<PathBuf>,
    pub limit: Option<usize>,
}

pub async fn list(
    State(app): State<App>,
    Query(query): Query<ListWorkflowsQuery>,
) -> Result<Json<Vec<WorkflowSummary>>, ApiError> {
    let filter = WorkflowFilter { status: query.status, worktree_path: query.worktree, limit: query.limit };
    let rows = WorkflowRepository::list(&*app.store, filter)?;
    Ok(Json(rows.into_iter().map(WorkflowSummary::from).collect()))
}

pub async fn detail(
    State(app): State<App>,
    Path(id): Path<WorkflowId>,
) -> Result<Json<WorkflowDetail>, ApiError> {
    let workflow = WorkflowRepository::get(&*app.store, id)?
        .ok_or_else(|| AmeliaError::not_found(format!("workflow {id} not found")))?;
    let plan = TaskPlanRepository::get(&*app.store, id)?;
    let events = EventRepository::list(&*app.store, id, None, Some(DETAIL_EVENT_LIMIT))?;
    Ok(Json(WorkflowDetail { workflow, plan, events }))
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowBody {
    pub issue_id: String,
    pub worktree_path: PathBuf,
    pub worktree_name: Option<String>,
    pub profile: Option<ProfileId>,
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    #[serde(default = "default_true")]
    pub start: bool,
    #[serde(default)]
    pub plan_now: bool,
    pub plan_file: Option<PathBuf>,
    pub plan_content: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CreateWorkflowResponse {
    pub workflow_id: WorkflowId,
}

/// `external_plan` source parsed from the mutually exclusive `plan_file` /
/// `plan_content` body fields shared by creation and `POST .../plan`
/// (spec §6).
fn plan_source(
    plan_file: Option<PathBuf>,
    plan_content: Option<String>,
) -> Result<Option<ExternalPlanSource>, ApiError> {
    match (plan_file, plan_content) {
        (Some(_), Some(_)) => {
            Err(AmeliaError::validation("plan_file and plan_content are mutually exclusive").into())
        }
        (Some(path), None) => Ok(Some(ExternalPlanSource::File(path))),
        (None, Some(content)) => Ok(Some(ExternalPlanSource::Content(content))),
        (None, None) => Ok(None),
    }
}

pub async fn create(
    State(app): State<App>,
    Json(body): Json<CreateWorkflowBody>,
) -> Result<(StatusCode, Json<CreateWorkflowResponse>), ApiError> {
    let external_plan = plan_source(body.plan_file, body.plan_content)?;

    let mut req = CreateWorkflowRequest::new(body.issue_id, body.worktree_path);
    if let Some(name) = body.worktree_name {
        req = req.with_worktree_name(name);
    }
    if let Some(profile_id) = body.profile {
        req = req.with_profile_id(profile_id);
    }
    if let Some(title) = body.task_title {
        req = req.with_title(title);
    }
    if let Some(description) = body.task_description {
        req = req.with_description(description);
    }
    if let Some(source) = external_plan {
        req = req.with_external_plan(source);
    }

    let workflow_id = if body.start {
        app.scheduler.start_workflow(req).await?
    } else if body.plan_now {
        if req.external_plan.is_some() {
            return Err(AmeliaError::validation(
                "plan_now cannot be combined with plan_file/plan_content; set start=true instead",
            )
            .into());
        }
        app.scheduler.queue_and_plan_workflow(req).await?
    } else {
        app.scheduler.queue_workflow(req).await?
    };

    Ok((StatusCode::CREATED, Json(CreateWorkflowResponse { workflow_id })))
}

pub async fn start(State(app): State<App>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    app.scheduler.start_pending_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn cancel(State(app): State<App>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    app.scheduler.cancel_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn approve(State(app): State<App>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    app.scheduler.approve_plan(id).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    pub feedback: Option<String>,
}

pub async fn reject(
    State(app): State<App>,
    Path(id): Path<WorkflowId>,
    body: Option<Json<RejectBody>>,
) -> Result<StatusCode, ApiError> {
    let feedback = body.and_then(|Json(b)| b.feedback);
    app.scheduler.reject_plan(id, feedback).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct SetPlanBody {
    pub plan_file: Option<PathBuf>,
    pub plan_content: Option<String>,
    #[serde(default)]
    pub force: bool,
}

pub async fn set_plan(
    State(app): State<App>,
    Path(id): Path<WorkflowId>,
    Json(body): Json<SetPlanBody>,
) -> Result<StatusCode, ApiError> {
    let source = plan_source(body.plan_file, body.plan_content)?
        .ok_or_else(|| AmeliaError::validation("one of plan_file or plan_content is required"))?;
    app.scheduler.set_external_plan(id, SetExternalPlanRequest { source, force: body.force }).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
pub struct StartBatchBody {
    pub workflow_ids: Option<Vec<WorkflowId>>,
    pub worktree_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct StartBatchResponse {
    pub started: Vec<WorkflowId>,
    pub errors: std::collections::HashMap<WorkflowId, String>,
}

pub async fn start_batch(
    State(app): State<App>,
    body: Option<Json<StartBatchBody>>,
) -> Result<Json<StartBatchResponse>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let selector = match (body.workflow_ids, body.worktree_path) {
        (Some(ids), _) => BatchSelector::WorkflowIds(ids),
        (None, Some(path)) => BatchSelector::Worktree(path),
        (None, None) => BatchSelector::AllPending,
    };
    let result = app.scheduler.start_batch_workflows(selector).await?;
    Ok(Json(StartBatchResponse { started: result.started, errors: result.errors.into_iter().collect() }))
}

#[cfg(test)]
#[path = "workflows_tests.rs"]
mod tests;
