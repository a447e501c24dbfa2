// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! `GET /api/config` (spec §6 "Bootstrap configuration"): the three fields a
//! dashboard/CLI needs to find the server, never the mutable settings that
//! live in the store.

use crate::app::App;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub host: String,
    pub port: u16,
    pub working_dir: PathBuf,
}

pub async fn get_config(State(app): State<App>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        host: app.config.host.clone(),
        port: app.config.port,
        working_dir: app.config.working_dir.clone(),
    })
}
