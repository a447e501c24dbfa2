// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Drop-guard around a driver session handle (SPEC_FULL §2 "Driver session
//! cleanup on cancellation"), grounded in the teacher's `CoopAgent`/
//! `RemoteAgent` pattern of tearing down a shutdown channel when the agent's
//! registry entry is dropped (`daemon/adapters/agent/coop/adapter.rs`,
//! `daemon/adapters/agent/remote.rs`). `cleanup_session` is async and best
//! effort (spec §4.5), so the guard spawns it on drop rather than blocking.

use crate::{Driver, SessionId};
use std::sync::Arc;

/// Holds a session open for the lifetime of one execution task. Whether the
/// task completes, is cancelled, or panics, dropping the guard schedules
/// [`Driver::cleanup_session`] so the underlying backend resource (subprocess,
/// remote conversation slot) is released instead of leaked.
pub struct SessionGuard {
    driver: Arc<dyn Driver>,
    session_id: Option<SessionId>,
}

impl SessionGuard {
    pub fn new(driver: Arc<dyn Driver>, session_id: SessionId) -> Self {
        Self { driver, session_id: Some(session_id) }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Take the session id out of the guard without triggering cleanup,
    /// e.g. when a workflow legitimately persists it for a future resumed
    /// `execute_agentic` call.
    pub fn into_session_id(mut self) -> Option<SessionId> {
        self.session_id.take()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session_id) = self.session_id.take() else { return };
        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            driver.cleanup_session(session_id).await;
        });
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
