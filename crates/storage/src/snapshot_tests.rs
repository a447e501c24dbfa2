// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use amelia_core::test_support::test_workflow;
use chrono::Utc;

#[test]
fn encode_then_decode_roundtrips() {
    let mut state = MaterializedState::default();
    state.workflows.insert(test_workflow("/tmp/w1").id, test_workflow("/tmp/w1"));
    let snapshot =
        Snapshot { version: CURRENT_SNAPSHOT_VERSION, seq: 7, state, created_at: Utc::now() };

    let bytes = encode(&snapshot).unwrap();
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded.seq, 7);
    assert_eq!(decoded.version, CURRENT_SNAPSHOT_VERSION);
    assert_eq!(decoded.state.workflows.len(), 1);
}

#[test]
fn decode_rejects_version_newer_than_binary() {
    let future = serde_json::json!({"v": 999, "seq": 1, "state": {}, "created_at": Utc::now()});
    let bytes = zstd::encode_all(serde_json::to_vec(&future).unwrap().as_slice(), 0).unwrap();
    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err, SnapshotError::Migration(_)));
}

#[test]
fn rotate_bak_path_keeps_three_generations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    std::fs::write(&path, b"one").unwrap();
    let bak1 = rotate_bak_path(&path);
    std::fs::write(&bak1, b"one").unwrap();

    std::fs::write(&path, b"two").unwrap();
    let bak2 = rotate_bak_path(&path);
    std::fs::write(&bak2, b"two").unwrap();

    assert_eq!(std::fs::read(path.with_extension("bak")).unwrap(), b"two");
    assert_eq!(std::fs::read(path.with_extension("bak.2")).unwrap(), b"one");
}
