//! Fractional order keys.
//!
//! Sibling order is defined by an `f64` key per record. New keys are placed
//! after, between, or below existing ones so that no other sibling has to be
//! renumbered. Every computed key is rounded to 15 significant digits to keep
//! repeated bisection from accumulating binary noise.

use crate::model::task::Task;

/// Significant digits kept on every stored key
pub const KEY_PRECISION: usize = 15;

/// Raised when a new key cannot be told apart from its neighbours at the
/// stored precision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("no room for a new order key between {lower} and {upper}")]
pub struct KeyExhausted {
    pub lower: f64,
    pub upper: f64,
}

/// Which side of a target sibling to place a key on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// Round to [`KEY_PRECISION`] significant digits
pub fn round_key(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*e}", KEY_PRECISION - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Step used for keys below a parent at `level`: 0.1 under a root, 0.01 under
/// a level-2 task.
pub fn level_multiplier(level: u8) -> f64 {
    10f64.powi(-i32::from(level))
}

/// Number of digits after the decimal point in the shortest rendering
fn decimal_places(value: f64) -> i32 {
    let text = value.to_string();
    text.split_once('.')
        .map(|(_, frac)| frac.len() as i32)
        .unwrap_or(0)
}

/// Midpoint of two keys, rounded. Fails when the rounded midpoint is not
/// strictly inside the bounds.
pub fn between(lower: f64, upper: f64) -> Result<f64, KeyExhausted> {
    let mid = round_key((lower + upper) / 2.0);
    if mid > lower && mid < upper {
        Ok(mid)
    } else {
        Err(KeyExhausted { lower, upper })
    }
}

fn siblings<'a>(
    tasks: &'a [Task],
    parent_id: Option<&'a str>,
    exclude: Option<&'a str>,
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks
        .iter()
        .filter(move |t| t.parent_id.as_deref() == parent_id && Some(t.id.as_str()) != exclude)
}

fn find<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Key for a record appended after the last sibling under `parent_id`
/// (`None` = root). `exclude` leaves one record out of the sibling set, used
/// when the record being placed is already a sibling.
///
/// - no siblings: `1` at root, `parent.order + 10^-parent.level` below a parent
/// - otherwise: `max + 10^-decimals(max) * 10^-parent.level`, or the midpoint
///   of `max` and `floor(max) + 1` once that increment is lost to rounding
pub fn append_order(
    tasks: &[Task],
    parent_id: Option<&str>,
    exclude: Option<&str>,
) -> Result<f64, KeyExhausted> {
    let parent = parent_id.and_then(|id| find(tasks, id));
    let max = siblings(tasks, parent_id, exclude)
        .map(|t| t.order)
        .fold(None, |acc: Option<f64>, o| Some(acc.map_or(o, |a| a.max(o))));

    let Some(max) = max else {
        return match parent {
            Some(p) => above(p.order, p.order + level_multiplier(p.level)),
            None => Ok(1.0),
        };
    };

    let multiplier = parent.map(|p| level_multiplier(p.level)).unwrap_or(1.0);
    let increment = 10f64.powi(-decimal_places(max)) * multiplier;
    let key = match above(max, max + increment) {
        Ok(key) => key,
        // the increment vanished at the stored precision: place it as if
        // dropped after the last sibling
        Err(_) => between(max, max.floor() + 1.0)?,
    };
    tracing::debug!(max, increment, key, "append order");
    Ok(key)
}

/// Key for a record placed as the first child of `parent`: midway between the
/// parent's key and its current first child, or `parent.order +
/// 10^-parent.level` when it has no children.
pub fn first_child_order(
    tasks: &[Task],
    parent: &Task,
    exclude: Option<&str>,
) -> Result<f64, KeyExhausted> {
    let first = siblings(tasks, Some(parent.id.as_str()), exclude)
        .map(|t| t.order)
        .fold(None, |acc: Option<f64>, o| Some(acc.map_or(o, |a| a.min(o))));
    match first {
        Some(first) => between(lower_bound(parent.order, first), first),
        None => above(parent.order, parent.order + level_multiplier(parent.level)),
    }
}

/// Key for a record placed immediately before or after `target` among its
/// siblings. `exclude` is the record being moved, so it never counts as the
/// neighbour.
///
/// Before the first sibling the lower bound is `0` at root or the parent's
/// own key when nested; after the last sibling the upper bound is
/// `floor(target.order) + 1`.
pub fn relative_order(
    tasks: &[Task],
    target: &Task,
    side: Side,
    exclude: Option<&str>,
) -> Result<f64, KeyExhausted> {
    let parent_id = target.parent_id.as_deref();
    let mut sibs: Vec<&Task> = siblings(tasks, parent_id, exclude).collect();
    sibs.sort_by(|a, b| a.order.total_cmp(&b.order));
    let idx = sibs.iter().position(|t| t.id == target.id);

    match side {
        Side::Before => {
            let prev = idx.and_then(|i| i.checked_sub(1)).map(|i| sibs[i].order);
            let lower = match prev {
                Some(order) => order,
                None => {
                    let floor = parent_id
                        .and_then(|id| find(tasks, id))
                        .map(|p| p.order)
                        .unwrap_or(0.0);
                    lower_bound(floor, target.order)
                }
            };
            between(lower, target.order)
        }
        Side::After => {
            let next = idx.and_then(|i| sibs.get(i + 1)).map(|t| t.order);
            let upper = next.unwrap_or_else(|| target.order.floor() + 1.0);
            between(target.order, upper)
        }
    }
}

/// Key for a record appended at root level: `floor(max root key) + 1`, or `1`
/// when there are no other roots.
pub fn root_append_order(tasks: &[Task], exclude: Option<&str>) -> f64 {
    siblings(tasks, None, exclude)
        .map(|t| t.order)
        .fold(None, |acc: Option<f64>, o| Some(acc.map_or(o, |a| a.max(o))))
        .map(|max| round_key(max.floor() + 1.0))
        .unwrap_or(1.0)
}

/// Use `preferred` as a lower bound if it is below `upper`; imported data can
/// hold children keyed below their parent, in which case fall back to one
/// unit below.
fn lower_bound(preferred: f64, upper: f64) -> f64 {
    if preferred < upper {
        preferred
    } else {
        upper - 1.0
    }
}

fn above(floor: f64, candidate: f64) -> Result<f64, KeyExhausted> {
    let key = round_key(candidate);
    if key > floor {
        Ok(key)
    } else {
        Err(KeyExhausted {
            lower: floor,
            upper: candidate,
        })
    }
}
