use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::model::project::ProjectData;
use crate::model::task::{MAX_LEVEL, ProfileAssignment, Task};
use crate::ops::hierarchy::ChildIndex;
use crate::ops::order::{self, KeyExhausted, Side};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("cannot add subtask: maximum nesting depth (3) reached")]
    MaxDepthReached,
    #[error("first-child placement needs a parent task")]
    FirstChildNeedsParent,
    #[error("cannot drop a task onto itself")]
    SelfTarget,
    #[error("cannot move {dragged} into its own descendant {target}")]
    Cycle { dragged: String, target: String },
    #[error("a target task is required to move {0}")]
    MissingTarget(DropPosition),
    #[error("task {0} is at level 3 and cannot have subtasks")]
    TargetAtMaxDepth(String),
    #[error("move would create a task hierarchy deeper than 3 levels")]
    TooDeep,
    #[error("cannot remove the last profile from task {0}")]
    LastProfile(String),
    #[error(transparent)]
    OrderExhausted(#[from] KeyExhausted),
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Where a new task goes among its siblings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// After the last sibling
    #[default]
    Append,
    /// Before the first existing child of the parent
    FirstChild,
}

/// Fields for a task about to be created
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub parent_id: Option<String>,
    pub placement: Placement,
}

impl NewTask {
    pub fn root(name: impl Into<String>) -> Self {
        NewTask {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn child(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        NewTask {
            name: name.into(),
            parent_id: Some(parent_id.into()),
            ..Default::default()
        }
    }
}

/// Add a task to the store. The level is derived from the parent.
/// Returns the assigned ID.
pub fn add_task(data: &mut ProjectData, new: NewTask) -> Result<String, TaskError> {
    let (parent_id, level, order) = match new.parent_id {
        None => {
            if new.placement == Placement::FirstChild {
                return Err(TaskError::FirstChildNeedsParent);
            }
            (None, 1, order::append_order(&data.tasks, None, None)?)
        }
        Some(pid) => {
            let parent = data
                .find(&pid)
                .ok_or_else(|| TaskError::NotFound(pid.clone()))?;
            if parent.level >= MAX_LEVEL {
                return Err(TaskError::MaxDepthReached);
            }
            let order = match new.placement {
                Placement::Append => order::append_order(&data.tasks, Some(pid.as_str()), None)?,
                Placement::FirstChild => order::first_child_order(&data.tasks, parent, None)?,
            };
            let level = parent.level + 1;
            (Some(pid), level, order)
        }
    };

    let id = next_task_id(data);
    tracing::info!(%id, ?parent_id, level, order, "task added");
    data.tasks.push(Task {
        id: id.clone(),
        order,
        name: new.name,
        description: new.description,
        profiles: Vec::new(),
        parent_id,
        level,
    });
    Ok(id)
}

/// Partial edit of a task's text fields
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn update_task(data: &mut ProjectData, task_id: &str, update: TaskUpdate) -> Result<(), TaskError> {
    let task = data
        .find_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if let Some(name) = update.name {
        task.name = name;
    }
    if let Some(description) = update.description {
        task.description = description;
    }
    Ok(())
}

/// Delete a task and all of its descendants.
/// Returns the removed IDs, the task itself first.
pub fn delete_task(data: &mut ProjectData, task_id: &str) -> Result<Vec<String>, TaskError> {
    let removed: Vec<String> = {
        let index = ChildIndex::new(&data.tasks);
        if index.position(task_id).is_none() {
            return Err(TaskError::NotFound(task_id.to_string()));
        }
        std::iter::once(task_id.to_string())
            .chain(
                index
                    .descendants(&data.tasks, task_id)
                    .into_iter()
                    .map(|pos| data.tasks[pos].id.clone()),
            )
            .collect()
    };

    let doomed: HashSet<&str> = removed.iter().map(|s| s.as_str()).collect();
    data.tasks.retain(|t| !doomed.contains(t.id.as_str()));
    tracing::info!(id = task_id, count = removed.len(), "task deleted");
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Profile assignments
// ---------------------------------------------------------------------------

pub fn add_profile(
    data: &mut ProjectData,
    task_id: &str,
    assignment: ProfileAssignment,
) -> Result<(), TaskError> {
    let task = data
        .find_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    task.profiles.push(assignment);
    Ok(())
}

/// Partial edit of one profile assignment
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub profile_type: Option<String>,
    pub timeline: Option<String>,
}

/// Edit the assignment at `index`. An out-of-range index is ignored;
/// returns whether anything was changed.
pub fn update_profile(
    data: &mut ProjectData,
    task_id: &str,
    index: usize,
    update: ProfileUpdate,
) -> Result<bool, TaskError> {
    let task = data
        .find_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    let Some(assignment) = task.profiles.get_mut(index) else {
        tracing::warn!(id = task_id, index, "profile index out of range, ignoring");
        return Ok(false);
    };
    if let Some(profile_type) = update.profile_type {
        assignment.profile_type = profile_type;
    }
    if let Some(timeline) = update.timeline {
        assignment.timeline = timeline;
    }
    Ok(true)
}

/// Remove the assignment at `index`. The last remaining assignment can't be
/// removed. An out-of-range index is ignored; returns whether anything was
/// removed.
pub fn remove_profile(data: &mut ProjectData, task_id: &str, index: usize) -> Result<bool, TaskError> {
    let task = data
        .find_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if index >= task.profiles.len() {
        tracing::warn!(id = task_id, index, "profile index out of range, ignoring");
        return Ok(false);
    }
    if task.profiles.len() == 1 {
        return Err(TaskError::LastProfile(task_id.to_string()));
    }
    task.profiles.remove(index);
    Ok(true)
}

// ---------------------------------------------------------------------------
// Move operations
// ---------------------------------------------------------------------------

/// Where a dragged task lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// Sibling of the target, just above it
    Before,
    /// Sibling of the target, just below it
    After,
    /// Last child of the target
    Inside,
    /// Last root task; takes no target
    Root,
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropPosition::Before => write!(f, "before"),
            DropPosition::After => write!(f, "after"),
            DropPosition::Inside => write!(f, "inside"),
            DropPosition::Root => write!(f, "root"),
        }
    }
}

/// What a successful move changed
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub parent_id: Option<String>,
    pub level: u8,
    pub order: f64,
    /// Number of descendants whose level was recomputed
    pub relevelled: usize,
}

/// Move a task (with its subtree) relative to `target_id`.
///
/// Validation happens before anything is touched; on error the store is
/// unchanged. Only the dragged task's parent/level/order and its descendants'
/// levels change. Descendant order keys and all other siblings are left alone.
pub fn move_task(
    data: &mut ProjectData,
    dragged_id: &str,
    target_id: Option<&str>,
    position: DropPosition,
) -> Result<MoveOutcome, TaskError> {
    let tasks = &data.tasks;
    let index = ChildIndex::new(tasks);
    let dragged_pos = index
        .position(dragged_id)
        .ok_or_else(|| TaskError::NotFound(dragged_id.to_string()))?;
    let descendants = index.descendants(tasks, dragged_id);

    if let Some(target) = target_id {
        if target == dragged_id {
            return Err(TaskError::SelfTarget);
        }
        if descendants.iter().any(|&pos| tasks[pos].id == target) {
            return Err(TaskError::Cycle {
                dragged: dragged_id.to_string(),
                target: target.to_string(),
            });
        }
    }

    let dragged_depth = index.subtree_depth(tasks, dragged_id);
    let max_level = usize::from(MAX_LEVEL);

    let (parent_id, level, order) = match position {
        DropPosition::Root => (None, 1, order::root_append_order(tasks, Some(dragged_id))),
        DropPosition::Inside => {
            let target = resolve_target(data, target_id, position)?;
            if target.level >= MAX_LEVEL {
                return Err(TaskError::TargetAtMaxDepth(target.id.clone()));
            }
            if usize::from(target.level) + dragged_depth > max_level {
                return Err(TaskError::TooDeep);
            }
            let order = order::append_order(tasks, Some(target.id.as_str()), Some(dragged_id))?;
            (Some(target.id.clone()), target.level + 1, order)
        }
        DropPosition::Before | DropPosition::After => {
            let target = resolve_target(data, target_id, position)?;
            if usize::from(target.level) + dragged_depth - 1 > max_level {
                return Err(TaskError::TooDeep);
            }
            let side = if position == DropPosition::Before {
                Side::Before
            } else {
                Side::After
            };
            let order = order::relative_order(tasks, target, side, Some(dragged_id))?;
            (target.parent_id.clone(), target.level, order)
        }
    };

    // Levels follow the parent chain depth-first; `descendants` is pre-order
    // so every parent is settled before its children.
    let mut new_levels: HashMap<&str, u8> = HashMap::new();
    new_levels.insert(dragged_id, level);
    let mut relevel = Vec::with_capacity(descendants.len());
    for &pos in &descendants {
        let task = &tasks[pos];
        let parent_level = task
            .parent_id
            .as_deref()
            .and_then(|pid| new_levels.get(pid).copied())
            .unwrap_or(level);
        let child_level = (parent_level + 1).min(MAX_LEVEL);
        new_levels.insert(task.id.as_str(), child_level);
        relevel.push((pos, child_level));
    }
    drop(new_levels);

    tracing::debug!(
        id = dragged_id,
        %position,
        ?parent_id,
        level,
        order,
        descendants = relevel.len(),
        "moving task"
    );

    let dragged = &mut data.tasks[dragged_pos];
    dragged.parent_id = parent_id.clone();
    dragged.level = level;
    dragged.order = order;
    for &(pos, child_level) in &relevel {
        data.tasks[pos].level = child_level;
    }

    tracing::info!(id = dragged_id, %position, "task moved");
    Ok(MoveOutcome {
        parent_id,
        level,
        order,
        relevelled: relevel.len(),
    })
}

fn resolve_target<'a>(
    data: &'a ProjectData,
    target_id: Option<&str>,
    position: DropPosition,
) -> Result<&'a Task, TaskError> {
    let id = target_id.ok_or(TaskError::MissingTarget(position))?;
    data.find(id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fresh ID in the form `task-<unix millis>-<9 random chars>`
fn next_task_id(data: &ProjectData) -> String {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("task-{}-{}", Utc::now().timestamp_millis(), &suffix[..9]);
        if !data.contains(&id) {
            return id;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
