// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! `GET/PUT /api/settings` (spec §6). `PUT` resizes the scheduler's
//! concurrency semaphore in the same request when `max_concurrent` changes
//! (`Scheduler::refresh_capacity`, spec §4.4).

use crate::app::App;
use crate::error::ApiError;
use amelia_core::ServerSettings;
use amelia_storage::{SettingsPatch, SettingsRepository};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

pub async fn get_settings(State(app): State<App>) -> Result<Json<ServerSettings>, ApiError> {
    Ok(Json(SettingsRepository::get(&*app.store)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsBody {
    pub max_concurrent: Option<u32>,
    pub websocket_idle_timeout_seconds: Option<u64>,
    pub workflow_start_timeout_seconds: Option<u64>,
    pub stream_tool_results: Option<bool>,
    pub checkpoint_retention_days: Option<u32>,
}

pub async fn update_settings(
    State(app): State<App>,
    Json(body): Json<UpdateSettingsBody>,
) -> Result<Json<ServerSettings>, ApiError> {
    let patch = SettingsPatch {
        max_concurrent: body.max_concurrent,
        websocket_idle_timeout_seconds: body.websocket_idle_timeout_seconds,
        workflow_start_timeout_seconds: body.workflow_start_timeout_seconds,
        stream_tool_results: body.stream_tool_results,
        checkpoint_retention_days: body.checkpoint_retention_days,
    };
    let settings = SettingsRepository::update(&*app.store, patch)?;
    if body.max_concurrent.is_some() {
        app.scheduler.refresh_capacity()?;
    }
    Ok(Json(settings))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
