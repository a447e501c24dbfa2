// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Snapshot persistence for crash recovery.
//!
//! A snapshot stores the complete [`MaterializedState`] at a point in time,
//! identified by the WAL sequence number it covers. Recovery loads the
//! snapshot and replays WAL entries after that sequence (spec §4.4
//! "Checkpointed restart").

use crate::migration::MigrationError;
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compression(std::io::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// A snapshot of the materialized state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    /// WAL sequence number covered by this snapshot.
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out. Keeps
/// up to [`MAX_BAK_FILES`] backups, evicting the oldest once full.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = std::fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = std::fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Encode a snapshot for on-disk storage: JSON, then zstd-compressed.
pub(crate) fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, SnapshotError> {
    let json = serde_json::to_vec(snapshot)?;
    zstd::encode_all(json.as_slice(), 0).map_err(SnapshotError::Compression)
}

/// Decode bytes written by [`encode`], running schema migration if the
/// embedded version is older than [`CURRENT_SNAPSHOT_VERSION`].
pub(crate) fn decode(bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
    let json = zstd::decode_all(bytes).map_err(SnapshotError::Compression)?;
    let raw: serde_json::Value = serde_json::from_slice(&json)?;
    let migrated = crate::migration::MigrationRegistry::new()
        .migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
    Ok(serde_json::from_value(migrated)?)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
