// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Resolves a [`DriverKind`] tag to a concrete [`Driver`] (spec §4.5, §9
//! "Driver plurality"). `amelia_core::profile::DriverKind`'s doc comment
//! names this crate as the resolver: agent runners and `amelia-scheduler`
//! never construct a [`crate::cli::CliDriver`] or [`crate::api::ApiDriver`]
//! directly, only ask a [`DriverFactory`] for "the driver for this kind".

use crate::{api::ApiDriver, cli::CliDriver, Driver};
use amelia_core::DriverKind;
use parking_lot::Mutex;
use std::sync::Arc;

/// Produces a [`Driver`] for a given [`DriverKind`], caching the instance
/// for the process lifetime so every workflow sharing a kind reuses the
/// same subprocess registry / HTTP client pool.
pub trait DriverFactory: Send + Sync {
    fn driver_for(&self, kind: DriverKind) -> Arc<dyn Driver>;
}

/// Settings needed to construct the two built-in drivers. Populated from
/// process environment at bootstrap (`amelia-server`'s `Config`), never
/// stored in `ServerSettings` — these are deployment-level, not
/// per-workflow tunables (spec §6 "Bootstrap configuration").
#[derive(Debug, Clone)]
pub struct DriverFactoryConfig {
    /// Path or name of the CLI binary `CliDriver` invokes.
    pub cli_binary: String,
    pub api_base_url: String,
    pub api_key: String,
}

/// Lazily builds and caches one driver instance per [`DriverKind`].
pub struct DefaultDriverFactory {
    config: DriverFactoryConfig,
    cli: Mutex<Option<Arc<CliDriver>>>,
    api: Mutex<Option<Arc<ApiDriver>>>,
}

impl DefaultDriverFactory {
    pub fn new(config: DriverFactoryConfig) -> Self {
        Self { config, cli: Mutex::new(None), api: Mutex::new(None) }
    }
}

impl DriverFactory for DefaultDriverFactory {
    fn driver_for(&self, kind: DriverKind) -> Arc<dyn Driver> {
        match kind {
            DriverKind::Cli => {
                let mut slot = self.cli.lock();
                let driver =
                    slot.get_or_insert_with(|| Arc::new(CliDriver::new(self.config.cli_binary.clone())));
                Arc::clone(driver) as Arc<dyn Driver>
            }
            DriverKind::Api => {
                let mut slot = self.api.lock();
                let driver = slot.get_or_insert_with(|| {
                    Arc::new(ApiDriver::new(self.config.api_base_url.clone(), self.config.api_key.clone()))
                });
                Arc::clone(driver) as Arc<dyn Driver>
            }
        }
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
