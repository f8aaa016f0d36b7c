//! Transient drag-and-drop gesture state.
//!
//! A `DragSession` lives only for the duration of one gesture: it remembers
//! which task is being dragged and where it would currently land. Dropping
//! hands the provisional position to [`move_task`]; cancelling discards it.
//! Nothing here is ever persisted.
//!
//! The `ct` binary moves tasks with `ct mv` and never builds a session. This
//! is the library entry point for interactive front ends that embed
//! `checktree` and drive moves from pointer events.

use crate::model::project::ProjectData;
use crate::model::task::MAX_LEVEL;
use crate::ops::task_ops::{DropPosition, MoveOutcome, TaskError, move_task};

/// A provisional drop: target row and position relative to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub target_id: Option<String>,
    pub position: DropPosition,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    dragged_id: String,
    hover: Option<DropTarget>,
}

impl DragSession {
    /// Start dragging `task_id`. Fails if the task doesn't exist.
    pub fn begin(data: &ProjectData, task_id: &str) -> Result<Self, TaskError> {
        if !data.contains(task_id) {
            return Err(TaskError::NotFound(task_id.to_string()));
        }
        Ok(DragSession {
            dragged_id: task_id.to_string(),
            hover: None,
        })
    }

    pub fn dragged_id(&self) -> &str {
        &self.dragged_id
    }

    pub fn hover_target(&self) -> Option<&DropTarget> {
        self.hover.as_ref()
    }

    /// Set the provisional drop explicitly. Hovering the dragged row itself
    /// clears it.
    pub fn hover(&mut self, target_id: Option<&str>, position: DropPosition) {
        if target_id == Some(self.dragged_id.as_str()) {
            self.hover = None;
            return;
        }
        self.hover = Some(DropTarget {
            target_id: target_id.map(String::from),
            position,
        });
    }

    /// Set the provisional drop from the pointer's vertical position within a
    /// row, as a fraction of the row height (0.0 = top edge).
    ///
    /// Top quarter drops before, bottom quarter after, and the middle drops
    /// inside unless the row is already at the deepest level.
    pub fn hover_fraction(&mut self, data: &ProjectData, target_id: &str, y_fraction: f64) {
        let Some(target) = data.find(target_id) else {
            self.hover = None;
            return;
        };
        let position = if y_fraction < 0.25 {
            DropPosition::Before
        } else if y_fraction > 0.75 {
            DropPosition::After
        } else if target.level < MAX_LEVEL {
            DropPosition::Inside
        } else {
            DropPosition::After
        };
        self.hover(Some(target_id), position);
    }

    /// Hover the empty area below the tree: drop as the last root task
    pub fn hover_root(&mut self) {
        self.hover(None, DropPosition::Root);
    }

    /// Leave the current row without entering another
    pub fn leave(&mut self) {
        self.hover = None;
    }

    /// Finish the gesture. Returns `Ok(None)` when there was no provisional
    /// drop; otherwise the result of the move.
    pub fn drop_on(self, data: &mut ProjectData) -> Result<Option<MoveOutcome>, TaskError> {
        let Some(pending) = self.hover else {
            tracing::debug!(id = %self.dragged_id, "drag ended without a drop target");
            return Ok(None);
        };
        move_task(data, &self.dragged_id, pending.target_id.as_deref(), pending.position).map(Some)
    }

    /// Abandon the gesture
    pub fn cancel(self) {
        tracing::debug!(id = %self.dragged_id, "drag cancelled");
    }
}
