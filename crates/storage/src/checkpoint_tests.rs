// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use crate::state::MaterializedState;
use amelia_core::test_support::test_workflow;
use tempfile::tempdir;

#[test]
fn checkpoint_then_load_roundtrips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    let checkpointer = Checkpointer::new(path.clone());

    let mut state = MaterializedState::default();
    let workflow = test_workflow("/tmp/w1");
    state.workflows.insert(workflow.id, workflow.clone());

    let result = checkpointer.checkpoint_sync(12, &state).unwrap();
    assert_eq!(result.seq, 12);
    assert!(result.size_bytes > 0);

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 12);
    assert_eq!(loaded.state.workflows.len(), 1);
    assert!(loaded.state.workflows.contains_key(&workflow.id));
}

#[test]
fn load_snapshot_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.bin");
    assert!(load_snapshot(&path).unwrap().is_none());
}

#[test]
fn load_snapshot_rotates_corrupt_file_and_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    std::fs::write(&path, b"not a valid zstd-compressed snapshot").unwrap();

    let result = load_snapshot(&path).unwrap();
    assert!(result.is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn checkpoint_overwrites_previous_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    let checkpointer = Checkpointer::new(path.clone());

    checkpointer.checkpoint_sync(1, &MaterializedState::default()).unwrap();
    checkpointer.checkpoint_sync(2, &MaterializedState::default()).unwrap();

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 2);
}
