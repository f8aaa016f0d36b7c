use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::ProjectConfig;
use super::task::Task;

/// The record store: every task, flat, in insertion order.
/// This is the persisted document shape (`{ "tasks": [...] }`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub tasks: Vec<Task>,
}

impl ProjectData {
    pub fn new(tasks: Vec<Task>) -> Self {
        ProjectData { tasks }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

/// A fully loaded checklist project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of `checktree/`)
    pub root: PathBuf,
    /// Path to the `checktree/` directory
    pub data_dir: PathBuf,
    /// Parsed config.toml (defaults when absent)
    pub config: ProjectConfig,
    /// The task store
    pub data: ProjectData,
}
