// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! amelia-agents: Architect, Developer, and Reviewer runner functions
//! (spec §4.6, C4). Each is a stateless function over a [`Driver`] and an
//! [`AgentContext`] (GLOSSARY "Agent") that reports progress through
//! [`EffectSink`] rather than mutating anything directly — `amelia-scheduler`
//! owns turning [`Effect`]s into persisted, sequenced events and workflow
//! transitions (SPEC_FULL §2 "Effect/Event separation").

pub mod architect;
pub mod developer;
pub mod reviewer;

mod context;
mod effect;
mod error;
mod issue;
mod output;

#[cfg(any(test, feature = "test-support"))]
pub mod fake_driver;

pub use amelia_driver::Driver;
pub use context::AgentContext;
pub use effect::{Effect, EffectSink};
pub use error::AgentRunnerError;
pub use issue::IssueBrief;
pub use reviewer::ReviewOutcome;

#[cfg(any(test, feature = "test-support"))]
pub use fake_driver::FakeDriver;
