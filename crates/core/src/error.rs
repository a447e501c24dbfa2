// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The domain error taxonomy (spec §7).
//!
//! Every fallible operation in the orchestrator core eventually produces an
//! [`AmeliaError`]. Crates that sit closer to I/O (`amelia-storage`,
//! `amelia-driver`) define their own `thiserror` enums and convert into this
//! one at the boundary, the way the teacher's `ExecuteError` wraps
//! `AgentAdapterError` and `WalError`.

use thiserror::Error;

/// Machine-readable error classification, surfaced to API callers as
/// `error.kind` alongside the human `error.message` (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    WrongState,
    WorktreeConflict,
    ConcurrencyLimit,
    ValidationError,
    Transient,
    DriverError,
    StorageError,
    Fatal,
}

crate::simple_display! {
    ErrorKind {
        NotFound => "not_found",
        WrongState => "wrong_state",
        WorktreeConflict => "worktree_conflict",
        ConcurrencyLimit => "concurrency_limit",
        ValidationError => "validation_error",
        Transient => "transient",
        DriverError => "driver_error",
        StorageError => "storage_error",
        Fatal => "fatal",
    }
}

/// A single crate-wide error type carrying both the [`ErrorKind`] and a
/// human-readable message. HTTP mapping lives in `amelia-server` (spec §4.8);
/// this crate stays transport-agnostic.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AmeliaError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AmeliaError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn wrong_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WrongState, message)
    }

    pub fn worktree_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WorktreeConflict, message)
    }

    pub fn concurrency_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConcurrencyLimit, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn driver(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DriverError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageError, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}
