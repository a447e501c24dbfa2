// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! REST surface over the Scheduler and repositories (spec §4.8, §6). Every
//! handler returns `Result<_, ApiError>`; `crate::error` is the only place
//! domain errors become status codes.

mod bootstrap;
mod profiles;
mod settings;
mod workflows;

use crate::app::App;
use axum::routing::{delete, get, post, put};
use axum::Router;

pub fn router() -> Router<App> {
    Router::new()
        .route("/api/config", get(bootstrap::get_config))
        .route("/api/workflows", get(workflows::list).post(workflows::create))
        .route("/api/workflows/start-batch", post(workflows::start_batch))
        .route("/api/workflows/:id", get(workflows::detail))
        .route("/api/workflows/:id/start", post(workflows::start))
        .route("/api/workflows/:id/cancel", post(workflows::cancel))
        .route("/api/workflows/:id/approve", post(workflows::approve))
        .route("/api/workflows/:id/reject", post(workflows::reject))
        .route("/api/workflows/:id/plan", post(workflows::set_plan))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/profiles", get(profiles::list).post(profiles::create))
        .route("/api/profiles/:id", put(profiles::update).delete(profiles::delete))
        .route("/api/profiles/:id/activate", post(profiles::activate))
}
