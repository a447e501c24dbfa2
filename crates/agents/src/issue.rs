// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The Architect's brief (spec §6, `POST /api/workflows` body fields
//! `task_title`/`task_description`). Not part of the core data model —
//! `Workflow` only stores `issue_id` (spec §3) — this is purely the prompt
//! input the caller supplied at creation time.

#[derive(Debug, Clone)]
pub struct IssueBrief {
    pub issue_id: String,
    pub task_title: Option<String>,
    pub task_description: Option<String>,
}

impl IssueBrief {
    pub fn new(issue_id: impl Into<String>) -> Self {
        Self { issue_id: issue_id.into(), task_title: None, task_description: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task_title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = Some(description.into());
        self
    }
}
