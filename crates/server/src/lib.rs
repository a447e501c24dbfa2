// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! amelia-server: the HTTP API Layer and WebSocket Broadcaster (spec §4.7,
//! §4.8, C7/C8) over the [`App`] aggregate — the store, bus, and scheduler
//! constructed once at [`App::bootstrap`] and threaded through every
//! handler via axum's `State` extractor (spec §9 "Module-level/global
//! state").

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod ws;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use config::Config;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assembles the full router: the REST surface (spec §6) plus
/// `/ws/events` (spec §4.7), with request tracing and a permissive CORS
/// layer for the dashboard UI named as an external collaborator in spec §1.
pub fn router(app: App) -> Router {
    http::router()
        .route("/ws/events", get(ws::handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}
