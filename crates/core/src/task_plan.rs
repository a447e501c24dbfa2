// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! The structured result of the Architect phase (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

crate::define_id! {
    /// Identifier for a single task within a [`TaskPlan`].
    pub struct TaskId("tsk-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// One unit of work the Developer agent executes (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    /// Always "developer" today (spec §3); kept as a field rather than a
    /// constant so a future agent role can be assigned without a schema
    /// break.
    pub agent: String,
    pub dependencies: Vec<TaskId>,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            description: description.into(),
            agent: "developer".to_string(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
        }
    }

    pub fn depends_on(mut self, dep: TaskId) -> Self {
        self.dependencies.push(dep);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskPlanError {
    #[error("task {0} depends on unknown task {1}")]
    UnknownDependency(TaskId, TaskId),
    #[error("task dependency graph contains a cycle")]
    Cycle,
}

/// Structured plan produced by the Architect (spec §3).
///
/// Invariant: the dependency graph among `tasks` is a DAG; `execution_order`
/// is a topological sort of it (validated by [`TaskPlan::execution_order`],
/// not cached on the struct, so it always reflects the current `tasks`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPlan {
    pub goal: String,
    pub key_files: Vec<String>,
    pub tasks: Vec<Task>,
}

impl TaskPlan {
    pub fn new(goal: impl Into<String>, key_files: Vec<String>, tasks: Vec<Task>) -> Self {
        Self { goal: goal.into(), key_files, tasks }
    }

    /// Topologically sort `tasks` by `dependencies`, failing if the graph is
    /// not a DAG or references an unknown task id (spec §3 invariant).
    ///
    /// Uses Kahn's algorithm; ties are broken by the tasks' original order so
    /// the sort is deterministic for identical input.
    pub fn execution_order(&self) -> Result<Vec<TaskId>, TaskPlanError> {
        let index: HashMap<TaskId, usize> =
            self.tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        for task in &self.tasks {
            for dep in &task.dependencies {
                if !index.contains_key(dep) {
                    return Err(TaskPlanError::UnknownDependency(task.id, *dep));
                }
            }
        }

        let mut in_degree: Vec<usize> = vec![0; self.tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.tasks.len()];
        for (i, task) in self.tasks.iter().enumerate() {
            in_degree[i] = task.dependencies.len();
            for dep in &task.dependencies {
                dependents[index[dep]].push(i);
            }
        }

        let mut ready: Vec<usize> =
            (0..self.tasks.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.tasks.len());
        let mut visited = HashSet::new();

        while !ready.is_empty() {
            ready.sort_unstable();
            let i = ready.remove(0);
            visited.insert(i);
            order.push(self.tasks[i].id);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(dependent);
                }
            }
        }

        if visited.len() != self.tasks.len() {
            return Err(TaskPlanError::Cycle);
        }
        Ok(order)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

#[cfg(test)]
#[path = "task_plan_tests.rs"]
mod tests;
