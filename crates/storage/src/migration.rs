// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Snapshot schema migrations.
//!
//! Snapshots are tagged with a schema version so a future field addition
//! doesn't break loading an older on-disk snapshot. No migrations are
//! registered yet — [`CURRENT_SNAPSHOT_VERSION`] is 1 and
//! `MigrationRegistry::new()` starts empty — but the chain is wired up
//! front the way the teacher's `oj-storage` does, so adding one later is a
//! `Migration` impl plus a `migrations.push(...)`, not a format change.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than this binary supports ({1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}

/// One schema step, `source_version -> target_version`.
pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

#[derive(Default)]
pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `raw["v"]` forward to `target`, applying registered migrations
    /// in sequence. A no-op when the snapshot is already at `target`.
    pub fn migrate_to(&self, mut raw: Value, target: u32) -> Result<Value, MigrationError> {
        let mut current = raw["v"].as_u64().unwrap_or(1) as u32;
        if current == target {
            return Ok(raw);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }
        while current < target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == current)
                .ok_or(MigrationError::NoPath(current, target))?;
            step.migrate(&mut raw)?;
            current = step.target_version();
            raw["v"] = serde_json::Value::from(current);
        }
        Ok(raw)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
