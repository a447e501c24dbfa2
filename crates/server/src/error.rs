// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Maps [`AmeliaError`] onto HTTP per spec §4.8's table. Every handler in
//! `crate::http` returns `Result<_, ApiError>`; this is the single place
//! that table is encoded, the same chokepoint the teacher's listener keeps
//! its `ExecuteError -> wire::Response` mapping in one function rather than
//! scattering status codes across handlers.

use amelia_core::{AmeliaError, ErrorKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError(AmeliaError);

impl From<AmeliaError> for ApiError {
    fn from(err: AmeliaError) -> Self {
        Self(err)
    }
}

impl From<amelia_storage::StorageError> for ApiError {
    fn from(err: amelia_storage::StorageError) -> Self {
        Self(err.into())
    }
}

impl From<amelia_scheduler::SchedulerError> for ApiError {
    fn from(err: amelia_scheduler::SchedulerError) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: String,
    message: String,
}

/// spec §4.8's error-mapping table, plus `Fatal` (spec §7 treats it as an
/// invariant breach the process survives, but an API caller still needs
/// *some* status — 500, same as any other unexpected condition).
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::WrongState => StatusCode::CONFLICT,
        ErrorKind::WorktreeConflict => StatusCode::CONFLICT,
        ErrorKind::ConcurrencyLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Transient | ErrorKind::DriverError | ErrorKind::StorageError | ErrorKind::Fatal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(kind = %self.0.kind, message = %self.0.message, "unexpected error serving request");
        }
        let body = ErrorBody { error: ErrorDetail { kind: self.0.kind.to_string(), message: self.0.message } };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
