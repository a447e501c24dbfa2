// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Opens a [`Store`] over a state directory: load the newest snapshot (if
//! any), replay the WAL entries after it, and hand back a store ready for
//! repository calls — the sequence `amelia-server`'s startup runs before it
//! accepts traffic, mirroring the teacher's `daemon::lifecycle::startup`
//! (load snapshot → open WAL → replay → construct).

use crate::checkpoint::load_snapshot;
use crate::error::StorageError;
use crate::repository::Store;
use crate::state::MaterializedState;
use crate::wal::Wal;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Fixed file names under the state directory a [`Store`] owns.
pub const WAL_FILE_NAME: &str = "wal.log";
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.bin";

/// Outcome of [`open`], so the caller can log what recovery actually did.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryReport {
    pub loaded_snapshot: bool,
    pub snapshot_seq: u64,
    pub replayed_entries: usize,
}

/// Open (creating if absent) the WAL and snapshot under `dir`, replay
/// unprocessed entries into the materialized state, and return a ready
/// [`Store`] plus a report of what recovery found.
pub fn open_store(dir: &Path) -> Result<(Store, RecoveryReport), StorageError> {
    std::fs::create_dir_all(dir)?;
    let snapshot_path = dir.join(SNAPSHOT_FILE_NAME);
    let wal_path = dir.join(WAL_FILE_NAME);

    let (mut state, processed_seq, loaded_snapshot) = match load_snapshot(&snapshot_path)? {
        Some(snapshot) => (snapshot.state, snapshot.seq, true),
        None => (MaterializedState::default(), 0, false),
    };

    let mut wal = Wal::open(&wal_path, processed_seq)?;
    let mut replayed_entries = 0;
    while let Some(entry) = wal.next_unprocessed()? {
        state.apply_op(&entry.op);
        wal.mark_processed(entry.seq);
        replayed_entries += 1;
    }

    let report = RecoveryReport { loaded_snapshot, snapshot_seq: processed_seq, replayed_entries };
    let store = Store::new(Arc::new(Mutex::new(state)), Arc::new(Mutex::new(wal)));
    Ok((store, report))
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
