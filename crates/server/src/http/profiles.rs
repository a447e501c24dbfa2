// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! `GET/POST/PUT/DELETE /api/profiles`, `POST /api/profiles/{id}/activate`
//! (spec §6).

use crate::app::App;
use crate::error::ApiError;
use amelia_core::{AgentProfileConfig, AmeliaError, Profile, ProfileId};
use amelia_storage::ProfileRepository;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct CreateProfileBody {
    pub name: String,
    pub architect: AgentProfileConfig,
    pub developer: AgentProfileConfig,
    pub reviewer: AgentProfileConfig,
    pub tracker: Option<String>,
    pub working_dir: PathBuf,
    pub plan_output_dir: PathBuf,
    pub plan_path_pattern: String,
    #[serde(default)]
    pub auto_approve_reviews: bool,
    #[serde(default = "default_max_review_iterations")]
    pub max_review_iterations: u32,
    #[serde(default)]
    pub is_active: bool,
}

fn default_max_review_iterations() -> u32 {
    3
}

pub async fn list(State(app): State<App>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(ProfileRepository::list(&*app.store)?))
}

pub async fn create(
    State(app): State<App>,
    Json(body): Json<CreateProfileBody>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let profile = Profile {
        id: ProfileId::new(),
        name: body.name,
        architect: body.architect,
        developer: body.developer,
        reviewer: body.reviewer,
        tracker: body.tracker,
        working_dir: body.working_dir,
        plan_output_dir: body.plan_output_dir,
        plan_path_pattern: body.plan_path_pattern,
        auto_approve_reviews: body.auto_approve_reviews,
        max_review_iterations: body.max_review_iterations,
        is_active: body.is_active,
    };
    ProfileRepository::create(&*app.store, profile.clone())?;
    if profile.is_active {
        ProfileRepository::set_active(&*app.store, profile.id)?;
    }
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update(
    State(app): State<App>,
    Path(id): Path<ProfileId>,
    Json(mut body): Json<Profile>,
) -> Result<Json<Profile>, ApiError> {
    if ProfileRepository::get(&*app.store, id)?.is_none() {
        return Err(AmeliaError::not_found(format!("profile {id} not found")).into());
    }
    body.id = id;
    ProfileRepository::update(&*app.store, body.clone())?;
    Ok(Json(body))
}

pub async fn delete(State(app): State<App>, Path(id): Path<ProfileId>) -> Result<StatusCode, ApiError> {
    ProfileRepository::delete(&*app.store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate(State(app): State<App>, Path(id): Path<ProfileId>) -> Result<StatusCode, ApiError> {
    ProfileRepository::set_active(&*app.store, id)?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
