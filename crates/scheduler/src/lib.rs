// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! amelia-scheduler: the Orchestrator Scheduler (spec §4.4, C6) — admission
//! control, per-worktree mutual exclusion, the concurrency cap, the
//! execution task, and checkpointed restart.
//!
//! [`scheduler::Scheduler`] is the aggregate `amelia-server` constructs once
//! at startup and drives every admission op in spec §4.4's table through;
//! [`supervisor::Supervisor`] is the per-workflow phase runner it spawns;
//! [`executor::Executor`] is the sole path from an agent runner's
//! [`amelia_agents::Effect`] to durable storage and the bus.

mod backoff;
pub mod error;
mod event_source;
mod executor;
mod request;
mod scheduler;
mod supervisor;
mod worktree;

#[cfg(test)]
mod test_support;

pub use error::SchedulerError;
pub use event_source::StoreEventSource;
pub use executor::Executor;
pub use request::{BatchResult, BatchSelector, CreateWorkflowRequest, ExternalPlanSource, SetExternalPlanRequest};
pub use scheduler::Scheduler;
pub use supervisor::{resumes_at_execution, Outcome, Supervisor};
pub use worktree::{ReserveError, WorktreeSlots};
