// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! An in-process [`Driver`] double, queuing canned responses so runner tests
//! don't shell out or hit the network the way `amelia-driver`'s own
//! `wiremock`/subprocess-backed tests do.

use amelia_driver::{
    AgenticMessage, AgenticRequest, AgenticStream, Driver, DriverError, GenerateRequest,
    GenerateResult, SessionId,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeDriver {
    agentic: Mutex<Vec<Vec<Result<AgenticMessage, DriverError>>>>,
    generate: Mutex<Vec<Result<GenerateResult, DriverError>>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the messages returned by the next `execute_agentic` call.
    pub fn push_agentic(&self, messages: Vec<Result<AgenticMessage, DriverError>>) {
        self.agentic.lock().unwrap().push(messages);
    }

    /// Queues the result returned by the next `generate` call.
    pub fn push_generate(&self, result: Result<GenerateResult, DriverError>) {
        self.generate.lock().unwrap().push(result);
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResult, DriverError> {
        let mut queue = self.generate.lock().unwrap();
        if queue.is_empty() {
            panic!("FakeDriver::generate called with no queued response");
        }
        queue.remove(0)
    }

    async fn execute_agentic(&self, _request: AgenticRequest) -> Result<AgenticStream, DriverError> {
        let mut queue = self.agentic.lock().unwrap();
        if queue.is_empty() {
            panic!("FakeDriver::execute_agentic called with no queued response");
        }
        let messages = queue.remove(0);
        Ok(Box::pin(tokio_stream::iter(messages)))
    }

    async fn cleanup_session(&self, _session_id: SessionId) {}
}
