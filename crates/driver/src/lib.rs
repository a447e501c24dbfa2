// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! amelia-driver: the uniform contract over heterogeneous LLM backends (spec §4.5).
//!
//! Agent runners (`amelia-agents`) never see a concrete backend, only
//! [`Driver`]. Two implementations live here, sharing nothing but the trait
//! and the [`AgenticMessage`] stream type (spec §9 "Driver plurality"):
//! [`cli::CliDriver`] wraps a subprocess-based coding agent CLI the way the
//! teacher's `LocalAdapter` wraps a coop sidecar process; [`api::ApiDriver`]
//! talks to an HTTP completions API directly, grounded in the teacher's
//! bearer-token `RemoteCoopClient` transport but over `reqwest` rather than a
//! hand-rolled HTTP/1.1 writer, since Amelia's API backend is a real public
//! HTTP API rather than a loopback sidecar.

pub mod api;
pub mod cli;
mod error;
mod factory;
mod message;
mod session;

pub use error::{DriverError, SchemaError};
pub use factory::{DefaultDriverFactory, DriverFactory, DriverFactoryConfig};
pub use message::{AgenticMessage, AgenticRequest, GenerateRequest, GenerateResult};
pub use session::SessionGuard;

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

amelia_core::define_id! {
    /// Identifier threading conversational continuity across `execute_agentic`
    /// calls (spec §4.5).
    pub struct SessionId("ses-");
}

/// A lazy, ordered, finite sequence of [`AgenticMessage`]s (spec §4.5
/// "Guarantees"). The last `Ok` item is always a `Result` message on success,
/// or the stream ends with an `Err` after a terminal error tool result.
pub type AgenticStream = Pin<Box<dyn Stream<Item = Result<AgenticMessage, DriverError>> + Send>>;

/// The single contract every LLM backend implements (spec §4.5).
#[async_trait]
pub trait Driver: Send + Sync {
    /// One-shot completion. If `request.schema` is set, the result's
    /// `structured` field is populated or the call fails with
    /// [`DriverError::Schema`].
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResult, DriverError>;

    /// Multi-step tool-using run. Cancelling the returned stream's consumer
    /// (dropping it) terminates the producer promptly (spec §4.5).
    async fn execute_agentic(&self, request: AgenticRequest) -> Result<AgenticStream, DriverError>;

    /// Best-effort release of a session's backing resources (spec §4.5).
    async fn cleanup_session(&self, session_id: SessionId);
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
