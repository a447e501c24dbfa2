// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! `tracing` + `tracing-subscriber` initialization, with a rotating file
//! appender for the server log (SPEC_FULL §1 "Logging"). Structured fields
//! (`workflow_id`, `worktree_path`, `effect=...`) are attached at the call
//! sites in `amelia-scheduler`/`amelia-agents`, not here — this module only
//! wires up the subscriber those `tracing::info!`/`tracing::warn!` calls
//! write through.

use crate::config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global subscriber. The returned [`WorkerGuard`] must be
/// held for the process lifetime — dropping it stops the background writer
/// thread and silently truncates buffered log lines, the same gotcha the
/// teacher's log-writing background tasks are careful to avoid by holding
/// their channel sender for the duration of the process.
pub fn init(config: &Config) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "amelia-server.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer().with_target(false).with_ansi(false).with_writer(non_blocking);

    tracing_subscriber::registry().with(env_filter).with(stdout_layer).with(file_layer).init();

    guard
}
