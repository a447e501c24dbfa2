// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Shared `agent_output` event construction (spec §6), used by every runner
//! when mirroring a driver message onto the event log.

use crate::{AgentContext, Effect, EffectSink};
use amelia_core::{Clock, Event, EventType};
use amelia_driver::AgenticMessage;

pub(crate) fn emit_agent_output<C: Clock>(
    ctx: &AgentContext<C>,
    sink: &EffectSink,
    agent: &str,
    message: &AgenticMessage,
) {
    let now = ctx.clock.epoch_ms();
    let event = match message {
        AgenticMessage::Thinking { content } => {
            Event::new(ctx.workflow_id, EventType::AgentOutput, content.clone(), now).with_agent(agent)
        }
        AgenticMessage::ToolCall { tool_name, tool_input, .. } => {
            Event::new(ctx.workflow_id, EventType::AgentOutput, format!("tool call: {tool_name}"), now)
                .with_agent(agent)
                .with_data(tool_input.clone())
        }
        AgenticMessage::ToolResult { tool_output, is_error, .. } => {
            let mut event =
                Event::new(ctx.workflow_id, EventType::AgentOutput, tool_output.clone(), now)
                    .with_agent(agent);
            if *is_error {
                event = event.as_error();
            }
            event
        }
        AgenticMessage::Result { content, .. } => {
            Event::new(ctx.workflow_id, EventType::AgentOutput, content.clone(), now).with_agent(agent)
        }
    };
    sink.emit(Effect::EmitEvent(event));
}
