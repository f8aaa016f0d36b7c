use serde::{Deserialize, Serialize, Serializer};

/// Deepest level a task may sit at (1 = root)
pub const MAX_LEVEL: u8 = 3;

/// A profile/timeline pairing on a task, e.g. `Associate` in `Week 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAssignment {
    pub profile_type: String,
    pub timeline: String,
}

impl ProfileAssignment {
    pub fn new(profile_type: impl Into<String>, timeline: impl Into<String>) -> Self {
        ProfileAssignment {
            profile_type: profile_type.into(),
            timeline: timeline.into(),
        }
    }
}

/// A single checklist record. Records are stored flat; hierarchy comes from
/// `parent_id`, sibling order from `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique record ID, e.g. `task-1` or `task-1718000000000-k3j9x0a2b`
    pub id: String,
    /// Fractional sort key among siblings. Only relative order matters.
    #[serde(serialize_with = "serialize_order")]
    pub order: f64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profiles: Vec<ProfileAssignment>,
    /// Parent record ID (absent for roots). A dangling ID is treated as root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Depth in the tree, 1..=3
    #[serde(default = "default_level")]
    pub level: u8,
}

fn default_level() -> u8 {
    1
}

/// Whole-number keys are written as integers (`1`, not `1.0`) so exported
/// documents keep the same shape as hand-written ones.
fn serialize_order<S: Serializer>(order: &f64, s: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if order.is_finite() && order.fract() == 0.0 && order.abs() <= MAX_SAFE {
        s.serialize_i64(*order as i64)
    } else {
        s.serialize_f64(*order)
    }
}

impl Task {
    /// Create a root task with no profiles
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: f64) -> Self {
        Task {
            id: id.into(),
            order,
            name: name.into(),
            description: String::new(),
            profiles: Vec::new(),
            parent_id: None,
            level: 1,
        }
    }

    /// Builder-style helper for placing a task under a parent
    pub fn with_parent(mut self, parent_id: impl Into<String>, level: u8) -> Self {
        self.parent_id = Some(parent_id.into());
        self.level = level;
        self
    }

    /// The timeline this task is scheduled on for a given profile, if any.
    /// Only the first matching assignment counts.
    pub fn timeline_for(&self, profile_type: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|p| p.profile_type == profile_type)
            .map(|p| p.timeline.as_str())
    }
}

/// Read-time tree projection of a record. Borrows from the flat store and is
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TaskNode<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub children: Vec<TaskNode<'a>>,
}
