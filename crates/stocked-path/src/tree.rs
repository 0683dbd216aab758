//! Reading and writing values at a [`Pxth`] inside a `serde_json::Value`.
//!
//! The `deep_set`/`deep_unset` family never touches its input: each call
//! returns a new tree, so a caller that kept the previous tree keeps seeing
//! exactly what it saw before.

use serde_json::{Map, Value};

use crate::types::{Pxth, Segment};

/// Get a value from a tree by path.
///
/// Returns `None` if the path doesn't exist.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stocked_path::{deep_get, Pxth};
///
/// let doc = json!({"foo": {"bar": [10, 20]}});
/// assert_eq!(deep_get(&doc, &Pxth::new(["foo", "bar", "1"])), Some(&json!(20)));
/// assert_eq!(deep_get(&doc, &Pxth::new(["missing"])), None);
/// assert_eq!(deep_get(&doc, &Pxth::root()), Some(&doc));
/// ```
pub fn deep_get<'a>(tree: &'a Value, path: &Pxth) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |current, segment| match (current, segment) {
            (Value::Array(arr), Segment::Index(index)) => arr.get(*index),
            (Value::Object(map), Segment::Key(key)) => map.get(key),
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
            _ => None,
        })
}

/// Get a mutable reference to a value in a tree by path.
pub fn deep_get_mut<'a>(tree: &'a mut Value, path: &Pxth) -> Option<&'a mut Value> {
    let mut current = tree;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Array(arr), Segment::Index(index)) => arr.get_mut(*index)?,
            (Value::Object(map), segment) => map.get_mut(&segment.as_key())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Largest number of `null`s written to pad an array up to a target index.
///
/// Writing further past the end turns the array into an object keyed by
/// decimal indices, which [`deep_get`] still reads through `Index` segments.
pub const MAX_ARRAY_GAP: usize = 1 << 16;

/// Returns a copy of `tree` with `value` written at `path`.
///
/// Missing intermediate containers are created (an array when the next step
/// is an index, an object otherwise). Scalars and mismatched containers on
/// the way are replaced. Writing past the end of an array pads it with
/// `null`, up to [`MAX_ARRAY_GAP`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stocked_path::{deep_set, Pxth};
///
/// let before = json!({"a": 1});
/// let after = deep_set(&before, &Pxth::parse("b.list[1]").unwrap(), json!(true));
/// assert_eq!(after, json!({"a": 1, "b": {"list": [null, true]}}));
/// assert_eq!(before, json!({"a": 1}));
/// ```
pub fn deep_set(tree: &Value, path: &Pxth, value: Value) -> Value {
    let mut next = tree.clone();
    deep_set_in_place(&mut next, path, value);
    next
}

/// In-place variant of [`deep_set`], for trees the caller owns exclusively.
pub fn deep_set_in_place(tree: &mut Value, path: &Pxth, value: Value) {
    let mut current = tree;
    for segment in path.segments() {
        current = slot_mut(current, segment);
    }
    *current = value;
}

fn slot_mut<'a>(current: &'a mut Value, segment: &Segment) -> &'a mut Value {
    let far_past_end = matches!(
        (&*current, segment),
        (Value::Array(arr), Segment::Index(index)) if index.saturating_sub(arr.len()) > MAX_ARRAY_GAP
    );
    if far_past_end {
        spread_array(current);
    }
    match (current, segment) {
        (Value::Array(arr), Segment::Index(index)) => {
            if arr.len() <= *index {
                let len = index.checked_add(1).unwrap_or(*index);
                arr.resize(len, Value::Null);
            }
            &mut arr[*index]
        }
        (Value::Object(map), segment) => map.entry(segment.as_key()).or_insert(Value::Null),
        (other, segment) => {
            *other = empty_container(segment);
            slot_mut(other, segment)
        }
    }
}

fn empty_container(segment: &Segment) -> Value {
    match segment {
        Segment::Index(index) if *index <= MAX_ARRAY_GAP => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

/// Re-keys an array as an object of decimal indices.
fn spread_array(value: &mut Value) {
    if let Value::Array(items) = std::mem::take(value) {
        *value = Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
        );
    }
}

/// Returns a copy of `tree` with the value at `path` removed.
///
/// Unsetting the root yields `null`; unsetting a missing path returns an
/// unchanged copy.
pub fn deep_unset(tree: &Value, path: &Pxth) -> Value {
    let Ok(parent) = path.parent() else {
        return Value::Null;
    };
    let mut next = tree.clone();
    if let (Some(container), Some(last)) = (deep_get_mut(&mut next, &parent), path.last()) {
        match (container, last) {
            (Value::Object(map), segment) => {
                map.shift_remove(&segment.as_key());
            }
            (Value::Array(arr), Segment::Index(index)) if *index < arr.len() => {
                arr.remove(*index);
            }
            _ => {}
        }
    }
    next
}
