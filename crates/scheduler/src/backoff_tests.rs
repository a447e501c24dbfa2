// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use yare::parameterized;

#[parameterized(
    first = { 1, Duration::from_millis(500) },
    second = { 2, Duration::from_millis(1000) },
    third = { 3, Duration::from_millis(2000) },
    fourth = { 4, Duration::from_millis(4000) },
    capped = { 5, Duration::from_secs(8) },
    far_beyond_cap = { 20, Duration::from_secs(8) },
)]
fn delay_curve(attempt: u32, expected: Duration) {
    assert_eq!(delay_for(attempt), expected);
}

#[tokio::test(start_paused = true)]
async fn retries_up_to_max_attempts_on_transient_errors() {
    let calls = AtomicU32::new(0);
    let result: Result<(), &'static str> = retry_transient(3, |_: &&str| true, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("still failing") }
    })
    .await;

    assert_eq!(result, Err("still failing"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn stops_retrying_once_an_attempt_succeeds() {
    let calls = AtomicU32::new(0);
    let result = retry_transient(3, |_: &&str| true, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move { if n < 1 { Err("transient") } else { Ok(42) } }
    })
    .await;

    assert_eq!(result, Ok(42));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn non_transient_errors_are_not_retried() {
    let calls = AtomicU32::new(0);
    let result: Result<(), &'static str> = retry_transient(3, |_: &&str| false, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("fatal") }
    })
    .await;

    assert_eq!(result, Err("fatal"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
