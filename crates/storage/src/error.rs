// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Crate-local error type, folded into [`amelia_core::AmeliaError`] at the
//! scheduler/server boundary (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WAL error: {0}")]
    Wal(#[from] crate::wal::WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
    #[error("migration error: {0}")]
    Migration(#[from] crate::migration::MigrationError),
    #[error("not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<StorageError> for amelia_core::AmeliaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => amelia_core::AmeliaError::not_found(err.to_string()),
            other => amelia_core::AmeliaError::storage(other.to_string()),
        }
    }
}
