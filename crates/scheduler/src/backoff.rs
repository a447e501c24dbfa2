// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The retry/backoff curve for transient phase errors (spec §4.4 "On
//! transient errors... retries with exponential backoff bounded by a
//! per-phase cap"; curve fixed per SPEC_FULL §2/§3: base 500ms, ×2 per
//! attempt, capped at 8s, no jitter — single-process, so there's no
//! thundering-herd concern a jitter term would address).

use std::time::Duration;

const BASE: Duration = Duration::from_millis(500);
const CAP: Duration = Duration::from_secs(8);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the `attempt`-th retry (1-indexed: the delay before the
/// first retry, after the first failure, is `delay_for(1)`).
pub fn delay_for(attempt: u32) -> Duration {
    let multiplier = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    BASE.checked_mul(multiplier).unwrap_or(CAP).min(CAP)
}

/// Retry `f` up to `max_attempts` times total (the first call plus
/// `max_attempts - 1` retries), sleeping the backoff curve between
/// attempts. Stops early the first time `f` returns an error classified as
/// non-transient by `is_transient`, surfacing it immediately rather than
/// burning through the remaining attempts on an error retrying can't fix.
pub async fn retry_transient<T, E, F, Fut>(
    max_attempts: u32,
    is_transient: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_transient(&err) => {
                tokio::time::sleep(delay_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
