// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Binary entrypoint: load configuration, initialize logging, bootstrap the
//! [`App`] (store recovery + checkpointed restart), then bind and serve —
//! in that order, mirroring the teacher's startup sequence of
//! `create dirs -> acquire lock -> load snapshot -> open WAL+replay ->
//! bind listener last`, so a crash before the listener binds never leaves a
//! half-accepting process.

use amelia_server::{App, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let _log_guard = amelia_server::logging::init(&config);

    let socket_addr = config.socket_addr();
    let (app, report) = App::bootstrap(config).await?;
    tracing::info!(
        loaded_snapshot = report.loaded_snapshot,
        replayed_entries = report.replayed_entries,
        "amelia-server bootstrapped"
    );

    let router = amelia_server::router(app);
    let listener = tokio::net::TcpListener::bind(&socket_addr).await?;
    tracing::info!(address = %socket_addr, "amelia-server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
