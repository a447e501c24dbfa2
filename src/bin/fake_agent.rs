// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Stand-in coding-agent CLI for black-box tests (`tests/specs.rs`).
//!
//! Speaks just enough of `amelia-driver::cli::CliDriver`'s subprocess
//! contract (spec §4.5) to drive a workflow through Architect -> Developer
//! -> Reviewer without a real LLM: `generate --json-schema` returns a fixed
//! structured payload keyed off the prompt's content, `run --output-format
//! stream-json` emits a single terminal `result` line. Good enough to reach
//! every workflow status in spec §4.3 deterministically; not a fixture for
//! testing prompt behavior.

use std::io::Read;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut prompt = String::new();
    let _ = std::io::stdin().read_to_string(&mut prompt);

    match args.first().map(String::as_str) {
        Some("generate") => generate(&args, &prompt),
        Some("run") => run(),
        _ => std::process::exit(2),
    }
}

fn generate(args: &[String], prompt: &str) {
    if !args.iter().any(|a| a == "--json-schema") {
        println!("acknowledged");
        return;
    }
    if prompt.contains("Extract a structured task plan") {
        println!(
            "{}",
            serde_json::json!({
                "goal": "ship the requested change",
                "key_files": ["src/lib.rs"],
                "tasks": [{"description": "implement the change"}],
            })
        );
    } else {
        // Reviewer's verdict extraction is the only other `--json-schema`
        // caller (spec §4.6); approve unconditionally so the happy path
        // reaches `completed`.
        println!("{}", serde_json::json!({"approved": true, "feedback": "looks good"}));
    }
}

fn run() {
    println!(
        "{}",
        serde_json::json!({"type": "result", "content": "done", "session_id": "fake-session"})
    );
}
