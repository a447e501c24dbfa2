// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;

fn config() -> DriverFactoryConfig {
    DriverFactoryConfig {
        cli_binary: "amelia-agent-cli".to_string(),
        api_base_url: "http://localhost:9999".to_string(),
        api_key: "test-key".to_string(),
    }
}

#[test]
fn caches_the_same_driver_instance_per_kind() {
    let factory = DefaultDriverFactory::new(config());
    let a = factory.driver_for(DriverKind::Cli);
    let b = factory.driver_for(DriverKind::Cli);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn cli_and_api_kinds_are_independent() {
    let factory = DefaultDriverFactory::new(config());
    let cli = factory.driver_for(DriverKind::Cli);
    let api = factory.driver_for(DriverKind::Api);
    assert!(!Arc::ptr_eq(&cli, &api));
}
