// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Bootstrap configuration (spec §6 "Bootstrap configuration"): `host`,
//! `port`, and `database_path` only. Everything else that governs
//! orchestrator behavior (`max_concurrent`, websocket idle timeout,
//! retention, ...) is `ServerSettings`, a row in the store mutated through
//! the API — never a flag or env var here (spec §6, SPEC_FULL §1).
//!
//! Resolution order mirrors the teacher's `daemon::env` module:
//! `AMELIA_*` env var, falling back to a fixed default. The driver factory
//! fields (`cli_binary`, `api_base_url`, `api_key`) are deployment-level
//! secrets needed to construct the two `amelia-driver` backends (spec §4.5,
//! §9 "Driver plurality") — they are not part of spec §6's three named
//! fields, but they're no more a per-workflow tunable than `host`/`port`
//! are, so they live here rather than in `ServerSettings`.

use amelia_driver::DriverFactoryConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Root directory new worktrees are resolved relative to when a caller
    /// supplies a relative `worktree_path`; surfaced verbatim by
    /// `GET /api/config` (spec §6).
    pub working_dir: PathBuf,
    pub driver: DriverFactoryConfig,
    /// Directory the server's rotating log file is written under
    /// (SPEC_FULL §1 "tracing-appender for the server's rotating log file").
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment, falling back to
    /// fixed defaults for anything unset (teacher: `daemon::env::state_dir`).
    pub fn load() -> Self {
        let database_path = env_path("AMELIA_DATABASE_PATH").unwrap_or_else(default_database_path);
        let log_dir = env_path("AMELIA_LOG_DIR")
            .unwrap_or_else(|| database_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")));

        Self {
            host: std::env::var("AMELIA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("AMELIA_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(4590),
            working_dir: env_path("AMELIA_WORKING_DIR")
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
            driver: DriverFactoryConfig {
                cli_binary: std::env::var("AMELIA_CLI_BINARY").unwrap_or_else(|_| "amelia-agent".to_string()),
                api_base_url: std::env::var("AMELIA_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
                api_key: std::env::var("AMELIA_API_KEY").unwrap_or_default(),
            },
            database_path,
            log_dir,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn default_database_path() -> PathBuf {
    let state_dir = if let Ok(dir) = std::env::var("AMELIA_STATE_DIR") {
        PathBuf::from(dir)
    } else if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg).join("amelia")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/state/amelia")
    };
    state_dir.join("store")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
