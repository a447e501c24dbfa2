// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Per-worktree mutual exclusion plus the process-wide concurrency cap
//! (spec §4.4 "Per-worktree mutual exclusion", "Concurrency cap").
//!
//! Two independent admission checks gate a workflow's move to `in_progress`:
//! a worktree must not already have an active workflow (invariant §3.1), and
//! the total number of `in_progress` workflows must stay under
//! `ServerSettings.max_concurrent`. Both are expressed without a third-party
//! distributed lock — a `parking_lot::Mutex<HashMap<..>>` keyed by
//! `worktree_path` plus a `tokio::sync::Semaphore`, the shape SPEC_FULL §2
//! grounds in the teacher's runtime admission handlers.

use amelia_core::WorkflowId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// What's tracked for one reserved-or-occupied worktree: which workflow
/// holds it and the execution task driving it, so `cancel_workflow` can
/// reach in and abort it (spec §4.4's `active_tasks` map). The permit is
/// held here too, released back to the semaphore when the slot is dropped.
///
/// `workflow_id`/`handle` start `None` the instant [`WorktreeSlots::try_reserve`]
/// claims the path and are filled in by [`WorktreeSlots::occupy`] — the slot
/// is busy (and counted against the cap) for the whole span, not just from
/// `occupy` onward.
struct ActiveTask {
    workflow_id: Option<WorkflowId>,
    handle: Option<JoinHandle<()>>,
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    #[error("worktree already has an active workflow")]
    WorktreeBusy,
    #[error("at the concurrency limit")]
    ConcurrencyLimit,
}

/// A claim on one worktree path taken by [`WorktreeSlots::try_reserve`].
/// Dropping it releases the slot (and the permit backing it) unless it was
/// consumed by [`WorktreeSlots::occupy`] first — the same "clean up unless
/// disarmed" shape as `amelia_driver`'s `SessionGuard`, applied here so a
/// fallible step between reserving and spawning the execution task can't
/// leak a reservation nothing else will ever clear.
pub struct Reservation {
    slots: WorktreeSlots,
    worktree_path: PathBuf,
    armed: bool,
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.armed {
            self.slots.release(&self.worktree_path);
        }
    }
}

/// The admission map plus the global cap, shared by every admission op and
/// the restart scanner. Cheaply cloned; all clones share the same map and
/// semaphore.
#[derive(Clone)]
pub struct WorktreeSlots {
    active: Arc<Mutex<HashMap<PathBuf, ActiveTask>>>,
    permits: Arc<Semaphore>,
}

impl WorktreeSlots {
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            active: Arc::new(Mutex::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1) as usize)),
        }
    }

    /// Grow the cap when `ServerSettings.max_concurrent` increases. Shrinking
    /// takes effect only as outstanding permits are released — a `Semaphore`
    /// has no way to revoke permits already handed out, so this is
    /// conservative (never admits more than the configured cap from the
    /// moment a shrink is requested) rather than permissive.
    pub fn set_capacity(&self, max_concurrent: u32) {
        let target = max_concurrent.max(1) as usize;
        let held = self.active.lock().len();
        let current_total = self.permits.available_permits() + held;
        if target > current_total {
            self.permits.add_permits(target - current_total);
        }
    }

    /// Atomically check the worktree is free and the cap isn't reached, and
    /// if so claim both (spec §4.4 "Taking the slot is atomic with the
    /// status transition to `in_progress`"). The claim itself — inserting a
    /// placeholder `ActiveTask` with no workflow/handle yet — happens while
    /// `active`'s lock is still held, so the path is already "busy" to any
    /// concurrent `try_reserve` the instant this call returns `Ok`; nothing
    /// is deferred to [`Self::occupy`] that would reopen the window between
    /// the check and the reservation becoming visible.
    ///
    /// Returns a [`Reservation`] rather than the bare permit: a caller that
    /// does fallible work (resolving a profile, persisting a status
    /// transition) between reserving and spawning the execution task would
    /// otherwise leak the claim forever on an early `?` return, since
    /// nothing else ever removes a reserved-but-never-occupied entry from
    /// `active`. Dropping the reservation without passing it to
    /// [`Self::occupy`] releases the slot automatically.
    pub fn try_reserve(&self, worktree_path: &Path) -> Result<Reservation, ReserveError> {
        let mut active = self.active.lock();
        if active.contains_key(worktree_path) {
            return Err(ReserveError::WorktreeBusy);
        }
        let permit = Arc::clone(&self.permits).try_acquire_owned().map_err(|_| ReserveError::ConcurrencyLimit)?;
        active.insert(worktree_path.to_path_buf(), ActiveTask { workflow_id: None, handle: None, _permit: permit });
        Ok(Reservation { slots: self.clone(), worktree_path: worktree_path.to_path_buf(), armed: true })
    }

    /// Fill in the workflow/handle for the path a [`Reservation`] claimed,
    /// consuming it so it no longer releases the slot on drop. Logs and
    /// no-ops if the path is somehow no longer present — that would mean
    /// something else already removed it out from under a live reservation,
    /// which is always a bug.
    pub fn occupy(&self, mut reservation: Reservation, workflow_id: WorkflowId, handle: JoinHandle<()>) {
        let worktree_path = reservation.worktree_path.clone();
        {
            let mut active = self.active.lock();
            match active.get_mut(&worktree_path) {
                Some(task) => {
                    task.workflow_id = Some(workflow_id);
                    task.handle = Some(handle);
                }
                None => {
                    tracing::error!(
                        workflow_id = %workflow_id,
                        worktree = %worktree_path.display(),
                        "occupy called for a reservation no longer present in the active map"
                    );
                }
            }
        }
        reservation.armed = false;
    }

    /// Release the slot directly, for callers that reserved but never spawned
    /// a task (e.g. the execution task fails to start).
    pub fn release(&self, worktree_path: &Path) {
        self.active.lock().remove(worktree_path);
    }

    /// Swap in a new execution task handle for an already-occupied slot,
    /// without touching the permit or admitting a new reservation — used
    /// when a `blocked` workflow resumes (`approve_plan`) or a restart-time
    /// placeholder handle is replaced by the real resumed task. Returns
    /// `false` if the path isn't currently occupied.
    pub fn replace_handle(&self, worktree_path: &Path, handle: JoinHandle<()>) -> bool {
        let mut active = self.active.lock();
        match active.get_mut(worktree_path) {
            Some(task) => {
                if let Some(old) = task.handle.take() {
                    old.abort();
                }
                task.handle = Some(handle);
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, worktree_path: &Path) -> bool {
        self.active.lock().contains_key(worktree_path)
    }

    pub fn active_workflow(&self, worktree_path: &Path) -> Option<WorkflowId> {
        self.active.lock().get(worktree_path).and_then(|task| task.workflow_id)
    }

    /// Abort the execution task occupying `worktree_path`, if any. Returns
    /// `true` if a task was found and aborted; the slot itself is released
    /// when the aborted task's supervisor notices cancellation and the
    /// caller drops its `WorktreeSlots::release` on the way out, not here —
    /// aborting the task is not the same as releasing the slot, since the
    /// task's own unwind path is what persists `cancelled` durably.
    pub fn abort(&self, worktree_path: &Path) -> bool {
        let active = self.active.lock();
        match active.get(worktree_path).and_then(|task| task.handle.as_ref()) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn in_progress_count(&self) -> usize {
        self.active.lock().len()
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
