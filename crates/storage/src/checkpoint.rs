// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Writing and loading the on-disk snapshot file.

use crate::snapshot::{decode, encode, rotate_bak_path, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
use crate::state::MaterializedState;
use chrono::Utc;
use std::path::PathBuf;

/// Outcome of a successful [`Checkpointer::checkpoint_sync`] call.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

/// Writes [`Snapshot`]s to a single path, atomically.
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Serialize, compress, and atomically replace the snapshot file.
    ///
    /// Writes to `<path>.tmp` then renames over `path` so a crash mid-write
    /// never leaves a half-written snapshot for the next startup to load.
    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &MaterializedState,
    ) -> Result<CheckpointResult, SnapshotError> {
        let snapshot = Snapshot {
            version: CURRENT_SNAPSHOT_VERSION,
            seq,
            state: state.clone(),
            created_at: Utc::now(),
        };
        let bytes = encode(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(CheckpointResult { seq, size_bytes: bytes.len() as u64 })
    }
}

/// Load the snapshot at `path`, if one exists.
///
/// A snapshot that fails to decode (truncated write that somehow survived a
/// crash between the tmp-write and the rename, disk corruption) is rotated
/// into a `.bak` file and treated as "no snapshot" rather than failing
/// startup outright — the WAL alone remains a complete record from seq 0.
pub fn load_snapshot(path: &std::path::Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    match decode(&bytes) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(_) => {
            let bak = rotate_bak_path(path);
            std::fs::write(&bak, &bytes)?;
            std::fs::remove_file(path)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
