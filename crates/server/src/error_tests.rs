// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use axum::http::StatusCode;
use axum::response::IntoResponse;

fn status_of(err: AmeliaError) -> StatusCode {
    ApiError::from(err).into_response().status()
}

#[test]
fn not_found_maps_to_404() {
    assert_eq!(status_of(AmeliaError::not_found("nope")), StatusCode::NOT_FOUND);
}

#[test]
fn wrong_state_maps_to_409() {
    assert_eq!(status_of(AmeliaError::wrong_state("nope")), StatusCode::CONFLICT);
}

#[test]
fn worktree_conflict_maps_to_409() {
    assert_eq!(status_of(AmeliaError::worktree_conflict("busy")), StatusCode::CONFLICT);
}

#[test]
fn concurrency_limit_maps_to_429() {
    assert_eq!(status_of(AmeliaError::concurrency_limit("full")), StatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn validation_error_maps_to_422() {
    assert_eq!(status_of(AmeliaError::validation("bad")), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn storage_error_maps_to_500() {
    assert_eq!(status_of(AmeliaError::storage("disk gone")), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn fatal_error_maps_to_500() {
    assert_eq!(status_of(AmeliaError::fatal("sequence gap")), StatusCode::INTERNAL_SERVER_ERROR);
}
