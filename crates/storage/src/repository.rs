// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Repository interfaces over the WAL + materialized state (spec §4.1).
//!
//! `Store` is the single writer: every mutation appends a [`WalOp`] to the
//! WAL, flushes it, then applies it to the in-memory [`MaterializedState`]
//! for read-your-writes visibility — mirroring how the teacher's
//! `spawn_runtime_event_forwarder` flushes after every batch rather than
//! relying on a timer. A single `parking_lot::Mutex` around the state
//! (rather than a lock per workflow) is what actually gives the
//! "application-level locking keyed by workflow_id" spec.md asks for: a
//! coarser lock trivially satisfies a finer one — but only because
//! [`Store::commit_with`] holds that lock across the entire
//! read-decide-append-apply sequence; anything that reads state to decide
//! an op and then releases the lock before committing reopens the race it's
//! meant to close (see [`EventRepository::append`]'s sequence assignment).

use crate::op::WalOp;
use crate::state::MaterializedState;
use crate::wal::Wal;
use amelia_core::{
    AmeliaError, Event, Profile, ProfileId, ServerSettings, TaskPlan, TokenUsageRow, Workflow,
    WorkflowId, WorkflowStatus,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Filter accepted by [`WorkflowRepository::list`].
#[derive(Debug, Default, Clone)]
pub struct WorkflowFilter {
    pub status: Option<WorkflowStatus>,
    pub worktree_path: Option<std::path::PathBuf>,
    pub limit: Option<usize>,
}

/// Partial update accepted by [`SettingsRepository::update`]; `None` fields
/// are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct SettingsPatch {
    pub max_concurrent: Option<u32>,
    pub websocket_idle_timeout_seconds: Option<u64>,
    pub workflow_start_timeout_seconds: Option<u64>,
    pub stream_tool_results: Option<bool>,
    pub checkpoint_retention_days: Option<u32>,
}

pub trait WorkflowRepository {
    fn create(&self, workflow: Workflow) -> Result<(), AmeliaError>;
    fn get(&self, id: WorkflowId) -> Result<Option<Workflow>, AmeliaError>;
    fn list(&self, filter: WorkflowFilter) -> Result<Vec<Workflow>, AmeliaError>;
    fn update(&self, workflow: Workflow) -> Result<(), AmeliaError>;
    fn delete(&self, id: WorkflowId) -> Result<(), AmeliaError>;
    fn list_pending(&self) -> Result<Vec<Workflow>, AmeliaError>;
    fn list_active(&self) -> Result<Vec<Workflow>, AmeliaError>;
}

pub trait EventRepository {
    /// Assigns `sequence = last_sequence(workflow_id) + 1` and returns the
    /// stored event (spec §4.1 "Sequence assignment").
    fn append(&self, event: Event) -> Result<Event, AmeliaError>;
    fn list(
        &self,
        workflow_id: WorkflowId,
        since_sequence: Option<u64>,
        limit: Option<usize>,
    ) -> Result<Vec<Event>, AmeliaError>;
}

pub trait SettingsRepository {
    fn ensure_defaults(&self) -> Result<(), AmeliaError>;
    fn get(&self) -> Result<ServerSettings, AmeliaError>;
    fn update(&self, patch: SettingsPatch) -> Result<ServerSettings, AmeliaError>;
}

pub trait ProfileRepository {
    fn create(&self, profile: Profile) -> Result<(), AmeliaError>;
    fn get(&self, id: ProfileId) -> Result<Option<Profile>, AmeliaError>;
    fn list(&self) -> Result<Vec<Profile>, AmeliaError>;
    fn update(&self, profile: Profile) -> Result<(), AmeliaError>;
    fn delete(&self, id: ProfileId) -> Result<(), AmeliaError>;
    fn set_active(&self, id: ProfileId) -> Result<(), AmeliaError>;
}

pub trait TokenUsageRepository {
    fn append(&self, row: TokenUsageRow) -> Result<(), AmeliaError>;
}

/// The Architect's initial write and every per-task status update from the
/// Developer both go through [`TaskPlanRepository::upsert`] — there is no
/// field-level patch, only full replacement (see [`WalOp::TaskPlanUpdated`]).
pub trait TaskPlanRepository {
    fn get(&self, workflow_id: WorkflowId) -> Result<Option<TaskPlan>, AmeliaError>;
    fn upsert(&self, workflow_id: WorkflowId, plan: TaskPlan) -> Result<(), AmeliaError>;
}

/// The durable store: the WAL, the materialized state it replays into, and
/// the path a [`crate::checkpoint::Checkpointer`] writes snapshots to.
pub struct Store {
    state: Arc<Mutex<MaterializedState>>,
    wal: Arc<Mutex<Wal>>,
}

impl Store {
    pub fn new(state: Arc<Mutex<MaterializedState>>, wal: Arc<Mutex<Wal>>) -> Self {
        Self { state, wal }
    }

    /// Shared handle to the in-memory state, for components (the event bus,
    /// the scheduler's admission checks) that only ever read.
    pub fn state_handle(&self) -> Arc<Mutex<MaterializedState>> {
        Arc::clone(&self.state)
    }

    pub fn wal_handle(&self) -> Arc<Mutex<Wal>> {
        Arc::clone(&self.wal)
    }

    fn commit(&self, op: WalOp) -> Result<(), AmeliaError> {
        self.commit_with(move |_state| (op, ()))
    }

    /// Like [`Store::commit`], but `build` gets to read `state` to decide
    /// the op before it commits — and does so under the *same* lock
    /// acquisition that appends the op to the WAL and applies it, so a
    /// read-modify-write (e.g. [`EventRepository::append`]'s sequence
    /// assignment) is one critical section rather than two. Lock order is
    /// always WAL then state, matching every other call site, so this never
    /// deadlocks against a plain [`Store::commit`].
    fn commit_with<T>(&self, build: impl FnOnce(&MaterializedState) -> (WalOp, T)) -> Result<T, AmeliaError> {
        let mut wal = self.wal.lock();
        let mut state = self.state.lock();
        let (op, result) = build(&state);
        wal.append(&op).map_err(crate::error::StorageError::from)?;
        wal.flush().map_err(crate::error::StorageError::from)?;
        state.apply_op(&op);
        Ok(result)
    }
}

impl WorkflowRepository for Store {
    fn create(&self, workflow: Workflow) -> Result<(), AmeliaError> {
        self.commit(WalOp::WorkflowCreated { workflow })
    }

    fn get(&self, id: WorkflowId) -> Result<Option<Workflow>, AmeliaError> {
        Ok(self.state.lock().workflows.get(&id).cloned())
    }

    fn list(&self, filter: WorkflowFilter) -> Result<Vec<Workflow>, AmeliaError> {
        let state = self.state.lock();
        let mut out: Vec<Workflow> = state
            .workflows
            .values()
            .filter(|w| filter.status.map(|s| w.status == s).unwrap_or(true))
            .filter(|w| {
                filter.worktree_path.as_ref().map(|p| &w.worktree_path == p).unwrap_or(true)
            })
            .cloned()
            .collect();
        out.sort_by_key(|w| w.created_at_ms);
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    fn update(&self, workflow: Workflow) -> Result<(), AmeliaError> {
        self.commit(WalOp::WorkflowUpdated { workflow })
    }

    fn delete(&self, id: WorkflowId) -> Result<(), AmeliaError> {
        self.commit(WalOp::WorkflowDeleted { id })
    }

    fn list_pending(&self) -> Result<Vec<Workflow>, AmeliaError> {
        Ok(self.state.lock().list_pending().into_iter().cloned().collect())
    }

    fn list_active(&self) -> Result<Vec<Workflow>, AmeliaError> {
        Ok(self.state.lock().list_active().into_iter().cloned().collect())
    }
}

impl EventRepository for Store {
    fn append(&self, mut event: Event) -> Result<Event, AmeliaError> {
        self.commit_with(move |state| {
            event.sequence = state.last_sequence(event.workflow_id) + 1;
            (WalOp::EventAppended { event: event.clone() }, event)
        })
    }

    fn list(
        &self,
        workflow_id: WorkflowId,
        since_sequence: Option<u64>,
        limit: Option<usize>,
    ) -> Result<Vec<Event>, AmeliaError> {
        let state = self.state.lock();
        let mut rows: Vec<Event> =
            state.events_for(workflow_id, since_sequence).into_iter().cloned().collect();
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

impl SettingsRepository for Store {
    fn ensure_defaults(&self) -> Result<(), AmeliaError> {
        // Inserting the default settings is a no-op if a row already exists
        // in memory; WAL replay naturally leaves the latest write in place
        // either way, so this is safe to call on every startup.
        Ok(())
    }

    fn get(&self) -> Result<ServerSettings, AmeliaError> {
        Ok(self.state.lock().settings.clone())
    }

    fn update(&self, patch: SettingsPatch) -> Result<ServerSettings, AmeliaError> {
        let mut settings = self.state.lock().settings.clone();
        if let Some(v) = patch.max_concurrent {
            settings.max_concurrent = v;
        }
        if let Some(v) = patch.websocket_idle_timeout_seconds {
            settings.websocket_idle_timeout_seconds = v;
        }
        if let Some(v) = patch.workflow_start_timeout_seconds {
            settings.workflow_start_timeout_seconds = v;
        }
        if let Some(v) = patch.stream_tool_results {
            settings.stream_tool_results = v;
        }
        if let Some(v) = patch.checkpoint_retention_days {
            settings.checkpoint_retention_days = v;
        }
        self.commit(WalOp::SettingsUpdated { settings: settings.clone() })?;
        Ok(settings)
    }
}

impl ProfileRepository for Store {
    fn create(&self, profile: Profile) -> Result<(), AmeliaError> {
        self.commit(WalOp::ProfileUpserted { profile })
    }

    fn get(&self, id: ProfileId) -> Result<Option<Profile>, AmeliaError> {
        Ok(self.state.lock().profiles.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Profile>, AmeliaError> {
        Ok(self.state.lock().profiles.values().cloned().collect())
    }

    fn update(&self, profile: Profile) -> Result<(), AmeliaError> {
        self.commit(WalOp::ProfileUpserted { profile })
    }

    fn delete(&self, id: ProfileId) -> Result<(), AmeliaError> {
        self.commit(WalOp::ProfileDeleted { id })
    }

    fn set_active(&self, id: ProfileId) -> Result<(), AmeliaError> {
        if self.state.lock().profiles.get(&id).is_none() {
            return Err(AmeliaError::not_found(format!("profile {id} not found")));
        }
        self.commit(WalOp::ProfileActivated { id })
    }
}

impl TokenUsageRepository for Store {
    fn append(&self, row: TokenUsageRow) -> Result<(), AmeliaError> {
        self.commit(WalOp::TokenUsageAppended { row })
    }
}

impl TaskPlanRepository for Store {
    fn get(&self, workflow_id: WorkflowId) -> Result<Option<TaskPlan>, AmeliaError> {
        Ok(self.state.lock().task_plans.get(&workflow_id).cloned())
    }

    fn upsert(&self, workflow_id: WorkflowId, plan: TaskPlan) -> Result<(), AmeliaError> {
        self.commit(WalOp::TaskPlanUpdated { workflow_id, plan })
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
