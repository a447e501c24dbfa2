// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Shared fixtures for this crate's own HTTP/WS handler tests: a bootstrapped
//! [`App`] over a disposable on-disk store with one active profile, so every
//! `_tests.rs` side-module doesn't reimplement bootstrap wiring.

use crate::app::App;
use crate::config::Config;
use amelia_core::test_support as core_fixtures;
use amelia_storage::ProfileRepository;
use std::path::Path;

pub fn test_config(dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: dir.join("store"),
        working_dir: dir.to_path_buf(),
        driver: amelia_driver::DriverFactoryConfig {
            cli_binary: "true".to_string(),
            api_base_url: "http://localhost".to_string(),
            api_key: "test".to_string(),
        },
        log_dir: dir.to_path_buf(),
    }
}

/// Bootstraps an [`App`] with one active profile already stored, so
/// admission ops that call `resolve_profile(None)` succeed without every
/// test having to create one itself.
pub async fn test_app(dir: &Path) -> App {
    let (app, _report) = App::bootstrap(test_config(dir)).await.expect("bootstrap");
    let mut profile = core_fixtures::test_profile();
    profile.plan_output_dir = dir.join("plans");
    ProfileRepository::create(&*app.store, profile.clone()).expect("create profile");
    ProfileRepository::set_active(&*app.store, profile.id).expect("activate profile");
    app
}
