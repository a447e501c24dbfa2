// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

use super::*;
use amelia_core::{EventType, WorkflowId};

#[test]
fn emit_returns_false_once_the_receiver_is_dropped() {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = EffectSink::new(tx);
    drop(rx);

    let event = Event::new(WorkflowId::new(), EventType::AgentOutput, "hi", 0);
    assert!(!sink.emit(Effect::EmitEvent(event)));
}

#[test]
fn emit_delivers_effects_in_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = EffectSink::new(tx);

    sink.emit(Effect::SetPlanPath(PathBuf::from("/tmp/a.md")));
    sink.emit(Effect::SetPlanPath(PathBuf::from("/tmp/b.md")));

    assert!(matches!(rx.try_recv().unwrap(), Effect::SetPlanPath(p) if p == PathBuf::from("/tmp/a.md")));
    assert!(matches!(rx.try_recv().unwrap(), Effect::SetPlanPath(p) if p == PathBuf::from("/tmp/b.md")));
}
