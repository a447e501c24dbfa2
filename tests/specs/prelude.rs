// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Shared black-box test harness for `tests/specs.rs`.
//!
//! Spawns the real `amelia-serverd` binary against a throwaway store and
//! working directory, points its CLI driver at the `fake-agent` fixture
//! binary (`src/bin/fake_agent.rs`) so agent phases resolve instantly
//! without a real LLM, and exposes small `reqwest`-based helpers for
//! driving the HTTP API the way a caller in spec §6 would.

use std::future::Future;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Longest we'll wait for an async state change (plan completion, status
/// transition, ...) to land before failing a scenario.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

pub struct Server {
    child: Child,
    base_url: String,
    client: reqwest::Client,
    _tempdir: tempfile::TempDir,
}

impl Server {
    /// Boots `amelia-serverd` on an ephemeral port with a fresh on-disk
    /// store, and blocks until `GET /api/config` answers.
    pub async fn start() -> Self {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let port = free_port();

        let server_bin = assert_cmd::cargo::cargo_bin("amelia-serverd");
        let fake_agent = assert_cmd::cargo::cargo_bin("fake-agent");

        let child = Command::new(server_bin)
            .env("AMELIA_HOST", "127.0.0.1")
            .env("AMELIA_PORT", port.to_string())
            .env("AMELIA_DATABASE_PATH", tempdir.path().join("store"))
            .env("AMELIA_WORKING_DIR", tempdir.path())
            .env("AMELIA_LOG_DIR", tempdir.path().join("logs"))
            .env("AMELIA_CLI_BINARY", &fake_agent)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn amelia-serverd");

        let server = Self {
            child,
            base_url: format!("http://127.0.0.1:{port}"),
            client: reqwest::Client::new(),
            _tempdir: tempdir,
        };
        server.wait_until_ready().await;
        server
    }

    async fn wait_until_ready(&self) {
        let ready = wait_for(SPEC_WAIT_MAX_MS, || async {
            self.client.get(self.url("/api/config")).send().await.map(|r| r.status().is_success()).unwrap_or(false)
        })
        .await;
        assert!(ready, "amelia-serverd did not become ready in time");
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET request")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.expect("POST request")
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(&body).send().await.expect("POST request")
    }

    pub async fn workflow_status(&self, id: &str) -> String {
        let detail: serde_json::Value =
            self.get(&format!("/api/workflows/{id}")).await.json().await.expect("workflow detail");
        detail["status"].as_str().expect("status field").to_string()
    }

    /// A fresh, already-created directory under the server's tempdir, fit to
    /// pass as `worktree_path` — the CLI driver runs the fixture agent with
    /// this as its `current_dir`, so it must exist on disk.
    pub fn worktree(&self, name: &str) -> PathBuf {
        let path = self._tempdir.path().join("worktrees").join(name);
        std::fs::create_dir_all(&path).expect("create worktree dir");
        path
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Creates and activates a profile wired to the `fake-agent` CLI driver so a
/// scenario can immediately create workflows. No profile is ever auto-seeded
/// (spec §3 "Profile"), so every scenario needs one of these.
pub async fn ensure_profile(server: &Server) -> String {
    let body = serde_json::json!({
        "name": "spec-test",
        "architect": {"driver_kind": "cli", "model": "fake"},
        "developer": {"driver_kind": "cli", "model": "fake"},
        "reviewer": {"driver_kind": "cli", "model": "fake"},
        "working_dir": ".",
        "plan_output_dir": "./plans",
        "plan_path_pattern": "{worktree_name}/{issue_id}.md",
        "auto_approve_reviews": false,
        "max_review_iterations": 3,
        "is_active": true,
    });
    let resp = server.post_json("/api/profiles", body).await;
    assert!(resp.status().is_success(), "profile creation should succeed");
    let profile: serde_json::Value = resp.json().await.expect("profile body");
    profile["id"].as_str().expect("profile id").to_string()
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Polls `f` every 25ms until it returns `true` or `max_ms` elapses.
pub async fn wait_for<F, Fut>(max_ms: u64, mut f: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = std::time::Instant::now() + Duration::from_millis(max_ms);
    loop {
        if f().await {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
