use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::task::{Task, TaskNode};

/// Adjacency index over a flat task list, built once per read or mutation.
///
/// Positions refer to indices in the slice the index was built from. When IDs
/// collide the first record wins, matching lookup by ID elsewhere.
#[derive(Debug)]
pub struct ChildIndex<'a> {
    positions: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> ChildIndex<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut positions = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            positions.entry(task.id.as_str()).or_insert(i);
        }

        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (i, task) in tasks.iter().enumerate() {
            match task.parent_id.as_deref() {
                Some(pid) if positions.contains_key(pid) => {
                    children.entry(pid).or_default().push(i);
                }
                // Missing or dangling parent: treat as root
                _ => roots.push(i),
            }
        }

        ChildIndex {
            positions,
            children,
            roots,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Positions of the direct children of `id`, in store order
    pub fn children_of(&self, id: &str) -> &[usize] {
        self.children.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Positions of records with no (valid) parent, in store order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// All transitive descendants of `id`, depth-first pre-order.
    /// Never yields `id` itself, even when the data contains a parent cycle.
    pub fn descendants(&self, tasks: &[Task], id: &str) -> Vec<usize> {
        let mut out = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        if let Some(start) = self.position(id) {
            seen.insert(start);
        }
        let mut stack: Vec<usize> = self.children_of(id).iter().rev().copied().collect();
        while let Some(pos) = stack.pop() {
            if !seen.insert(pos) {
                continue;
            }
            out.push(pos);
            let child_id = tasks[pos].id.as_str();
            stack.extend(self.children_of(child_id).iter().rev().copied());
        }
        out
    }

    /// Length of the longest chain from `id` down to a leaf, counting `id`
    /// itself (a leaf has depth 1).
    pub fn subtree_depth(&self, tasks: &[Task], id: &str) -> usize {
        let mut seen = HashSet::new();
        self.depth_inner(tasks, id, &mut seen)
    }

    fn depth_inner<'t>(&self, tasks: &'t [Task], id: &'t str, seen: &mut HashSet<&'t str>) -> usize {
        if !seen.insert(id) {
            return 0;
        }
        let deepest = self
            .children_of(id)
            .iter()
            .map(|&pos| self.depth_inner(tasks, tasks[pos].id.as_str(), seen))
            .max()
            .unwrap_or(0);
        seen.remove(id);
        1 + deepest
    }
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Build the display forest from a flat list.
///
/// Children are sorted ascending by `order` at every level (stable, so equal
/// keys keep store order). Records whose parent is missing become roots.
/// Records caught in a parent cycle are unreachable from any root; they are
/// promoted to roots so that every input record appears exactly once.
pub fn build_hierarchy(tasks: &[Task]) -> Vec<TaskNode<'_>> {
    let index = ChildIndex::new(tasks);
    let mut visited = vec![false; tasks.len()];

    let mut roots: Vec<TaskNode> = Vec::new();
    for &pos in index.roots() {
        roots.push(build_node(tasks, &index, pos, &mut visited));
    }

    for pos in 0..tasks.len() {
        if !visited[pos] {
            tracing::warn!(id = %tasks[pos].id, "task is part of a parent cycle, showing it as a root");
            roots.push(build_node(tasks, &index, pos, &mut visited));
        }
    }

    sort_by_order(&mut roots);
    roots
}

fn build_node<'a>(
    tasks: &'a [Task],
    index: &ChildIndex<'a>,
    pos: usize,
    visited: &mut [bool],
) -> TaskNode<'a> {
    visited[pos] = true;
    let task = &tasks[pos];
    let mut children = Vec::new();
    // Duplicate IDs: only the first record owns the children
    if index.position(&task.id) == Some(pos) {
        for &child in index.children_of(&task.id) {
            if !visited[child] {
                children.push(build_node(tasks, index, child, visited));
            }
        }
    }
    sort_by_order(&mut children);
    TaskNode { task, children }
}

fn sort_by_order(nodes: &mut [TaskNode<'_>]) {
    nodes.sort_by(|a, b| a.task.order.total_cmp(&b.task.order));
}

/// Pre-order walk of a forest
pub fn flatten<'a>(nodes: &[TaskNode<'a>]) -> Vec<&'a Task> {
    let mut out = Vec::new();
    for node in nodes {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into<'a>(node: &TaskNode<'a>, out: &mut Vec<&'a Task>) {
    out.push(node.task);
    for child in &node.children {
        flatten_into(child, out);
    }
}

// ---------------------------------------------------------------------------
// Per-profile grouping
// ---------------------------------------------------------------------------

/// One timeline bucket of a profile checklist
#[derive(Debug, Clone, Serialize)]
pub struct TimelineGroup {
    pub timeline: String,
    /// Records in this bucket, in depth-first tree order
    pub tasks: Vec<Task>,
}

impl TimelineGroup {
    /// The tree restricted to this bucket. A record whose parent landed in a
    /// different bucket is a root here.
    pub fn hierarchy(&self) -> Vec<TaskNode<'_>> {
        build_hierarchy(&self.tasks)
    }
}

/// All tasks assigned to one profile, bucketed by timeline
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChecklist {
    pub profile: String,
    pub groups: Vec<TimelineGroup>,
}

impl ProfileChecklist {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum()
    }
}

/// Collect the checklist for `profile_type`.
///
/// The tree is built over the records carrying that profile, walked
/// depth-first, and each record lands in the bucket of its (first) assignment
/// for the profile. Buckets are ordered by their position in `timelines`;
/// unknown timelines come first, in the order they were met.
pub fn tasks_for_profile(tasks: &[Task], profile_type: &str, timelines: &[String]) -> ProfileChecklist {
    let filtered: Vec<Task> = tasks
        .iter()
        .filter(|t| t.timeline_for(profile_type).is_some())
        .cloned()
        .collect();

    let mut grouped: IndexMap<String, Vec<Task>> = IndexMap::new();
    for task in flatten(&build_hierarchy(&filtered)) {
        let timeline = task.timeline_for(profile_type).unwrap_or("Unassigned");
        grouped
            .entry(timeline.to_string())
            .or_default()
            .push(task.clone());
    }

    let mut groups: Vec<TimelineGroup> = grouped
        .into_iter()
        .map(|(timeline, tasks)| TimelineGroup { timeline, tasks })
        .collect();
    groups.sort_by_key(|g| timeline_rank(&g.timeline, timelines));

    ProfileChecklist {
        profile: profile_type.to_string(),
        groups,
    }
}

/// Sort rank of a timeline: its index in the configured list, or -1 when it
/// is not listed.
pub fn timeline_rank(timeline: &str, timelines: &[String]) -> i64 {
    timelines
        .iter()
        .position(|t| t == timeline)
        .map(|i| i as i64)
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::default_timelines;
    use crate::model::task::ProfileAssignment;

    fn task(id: &str, order: f64, parent: Option<&str>, level: u8) -> Task {
        let t = Task::new(id, id.to_uppercase(), order);
        match parent {
            Some(p) => t.with_parent(p, level),
            None => t,
        }
    }

    fn with_profile(mut t: Task, profile: &str, timeline: &str) -> Task {
        t.profiles.push(ProfileAssignment::new(profile, timeline));
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_build_sorts_every_level() {
        let tasks = vec![
            task("b", 2.0, None, 1),
            task("a", 1.0, None, 1),
            task("a2", 1.2, Some("a"), 2),
            task("a1", 1.1, Some("a"), 2),
            task("a11", 1.11, Some("a1"), 3),
        ];
        let forest = build_hierarchy(&tasks);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].task.id, "a");
        assert_eq!(forest[0].children[0].task.id, "a1");
        assert_eq!(forest[0].children[0].children[0].task.id, "a11");
        assert_eq!(forest[0].children[1].task.id, "a2");
        assert_eq!(ids(&flatten(&forest)), vec!["a", "a1", "a11", "a2", "b"]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let tasks = vec![task("a", 2.0, None, 1), task("orphan", 1.0, Some("gone"), 2)];
        let forest = build_hierarchy(&tasks);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].task.id, "orphan");
    }

    #[test]
    fn test_build_does_not_mutate_input() {
        let tasks = vec![task("b", 2.0, None, 1), task("a", 1.0, None, 1)];
        let before = tasks.clone();
        let _ = build_hierarchy(&tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_cycle_members_appear_once() {
        let tasks = vec![
            task("root", 1.0, None, 1),
            task("x", 2.0, Some("y"), 2),
            task("y", 3.0, Some("x"), 2),
        ];
        let forest = build_hierarchy(&tasks);
        let flat = flatten(&forest);
        assert_eq!(flat.len(), 3);
        let mut seen = ids(&flat);
        seen.sort();
        assert_eq!(seen, vec!["root", "x", "y"]);
    }

    #[test]
    fn test_flatten_contains_every_record_once() {
        let tasks = vec![
            task("r1", 1.0, None, 1),
            task("r2", 2.0, None, 1),
            task("c1", 1.1, Some("r1"), 2),
            task("c2", 2.1, Some("r2"), 2),
            task("g1", 1.11, Some("c1"), 3),
            task("g2", 1.12, Some("c1"), 3),
            task("lost", 0.5, Some("nowhere"), 2),
        ];
        let flat = flatten(&build_hierarchy(&tasks));
        assert_eq!(flat.len(), tasks.len());
        for t in &tasks {
            assert_eq!(flat.iter().filter(|f| f.id == t.id).count(), 1);
        }
    }

    #[test]
    fn test_index_descendants_and_depth() {
        let tasks = vec![
            task("a", 1.0, None, 1),
            task("b", 1.1, Some("a"), 2),
            task("c", 1.11, Some("b"), 3),
            task("d", 1.2, Some("a"), 2),
        ];
        let index = ChildIndex::new(&tasks);
        let desc: Vec<&str> = index
            .descendants(&tasks, "a")
            .into_iter()
            .map(|p| tasks[p].id.as_str())
            .collect();
        assert_eq!(desc, vec!["b", "c", "d"]);
        assert_eq!(index.subtree_depth(&tasks, "a"), 3);
        assert_eq!(index.subtree_depth(&tasks, "d"), 1);
        assert!(index.descendants(&tasks, "c").is_empty());
    }

    #[test]
    fn test_index_descendants_survive_cycle() {
        let tasks = vec![task("x", 1.0, Some("y"), 2), task("y", 2.0, Some("x"), 2)];
        let index = ChildIndex::new(&tasks);
        let desc = index.descendants(&tasks, "x");
        assert_eq!(desc, vec![1]);
        assert_eq!(index.subtree_depth(&tasks, "x"), 2);
    }

    #[test]
    fn test_profile_groups_follow_timeline_rank() {
        let tasks = vec![
            with_profile(task("late", 1.0, None, 1), "Associate", "Month 1"),
            with_profile(task("early", 2.0, None, 1), "Associate", "Week 1"),
            with_profile(task("odd", 3.0, None, 1), "Associate", "Week -1"),
            with_profile(task("other", 4.0, None, 1), "Manager", "Week 1"),
        ];
        let checklist = tasks_for_profile(&tasks, "Associate", &default_timelines());
        let timelines: Vec<&str> = checklist.groups.iter().map(|g| g.timeline.as_str()).collect();
        assert_eq!(timelines, vec!["Week -1", "Week 1", "Month 1"]);
        assert_eq!(checklist.task_count(), 3);
    }

    #[test]
    fn test_profile_child_in_other_timeline_is_root_of_its_group() {
        let tasks = vec![
            with_profile(task("p", 1.0, None, 1), "CDP", "Week 1"),
            with_profile(task("c", 1.1, Some("p"), 2), "CDP", "Week 2"),
            with_profile(task("d", 1.2, Some("p"), 2), "CDP", "Week 1"),
        ];
        let checklist = tasks_for_profile(&tasks, "CDP", &default_timelines());
        assert_eq!(checklist.groups.len(), 2);
        let week1 = &checklist.groups[0];
        assert_eq!(week1.timeline, "Week 1");
        let tree = week1.hierarchy();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].task.id, "d");
        let week2 = &checklist.groups[1];
        assert_eq!(week2.hierarchy()[0].task.id, "c");
    }

    #[test]
    fn test_profile_parent_without_profile_promotes_child() {
        let tasks = vec![
            task("p", 1.0, None, 1),
            with_profile(task("c", 1.1, Some("p"), 2), "Intern", "Week 4"),
        ];
        let checklist = tasks_for_profile(&tasks, "Intern", &default_timelines());
        assert_eq!(checklist.groups.len(), 1);
        assert_eq!(checklist.groups[0].tasks[0].id, "c");
    }

    #[test]
    fn test_profile_missing_is_empty() {
        let tasks = vec![task("a", 1.0, None, 1)];
        assert!(tasks_for_profile(&tasks, "Manager", &default_timelines()).is_empty());
    }

    #[test]
    fn test_timeline_rank_unknown_first() {
        let timelines = default_timelines();
        assert_eq!(timeline_rank("Week 1", &timelines), 0);
        assert_eq!(timeline_rank("Month 12", &timelines), 8);
        assert_eq!(timeline_rank("Someday", &timelines), -1);
    }
}
