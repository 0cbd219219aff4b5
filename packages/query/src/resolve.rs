//! The path resolver: one string, one property.

use std::any::Any;

use propkit_core::{name_hash, Flags, Value};
use propkit_table::{Dispatch, Table, LIST_END};

/// One parsed path segment suffix.
enum SegIndex {
    /// `name` - no bracket.
    None,
    /// `name[]` - the count pseudo-property. Only valid as the final
    /// segment.
    Count,
    /// `name[i]` - a list element.
    At(u64),
}

/// Read one property.
///
/// Returns `None` for any resolution failure: unknown segment, malformed
/// grammar, bracket use not matching the entry's shape, or a root prefix
/// that does not match the table name. Reads are never blocked by flags.
pub fn get(table: &Table, instance: &dyn Any, path: &str) -> Option<Value> {
    get_rec(table, instance, strip_root(table, path)?)
}

/// Write one property.
///
/// Returns `false` for every failure `get` can produce, plus: a value whose
/// type tag does not match the dispatcher, a write to a property whose
/// effective flags are read-only (at any level of the path), and a write
/// through an absent owned object.
pub fn set(table: &Table, instance: &mut dyn Any, path: &str, value: &Value) -> bool {
    match strip_root(table, path) {
        Some(rest) => set_rec(table, instance, rest, value),
        None => false,
    }
}

/// A named root table owns the leading `Name/` of every path.
fn strip_root<'p>(table: &Table, path: &'p str) -> Option<&'p str> {
    match table.name() {
        Some(name) => path.strip_prefix(name)?.strip_prefix('/'),
        None => Some(path),
    }
}

/// Split `name`, `name[i]` or `name[]` off the front of a path.
fn split_segment(path: &str) -> Option<(&str, SegIndex, &str)> {
    let name_end = path
        .find(|c| c == '/' || c == '[')
        .unwrap_or(path.len());
    let name = &path[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = &path[name_end..];
    let mut index = SegIndex::None;
    if let Some(inner) = rest.strip_prefix('[') {
        if let Some(after) = inner.strip_prefix(']') {
            index = SegIndex::Count;
            rest = after;
        } else {
            let close = inner.find(']')?;
            let digits = &inner[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            index = SegIndex::At(digits.parse().ok()?);
            rest = &inner[close + 1..];
        }
    }

    if rest.is_empty() {
        return Some((name, index, ""));
    }
    let tail = rest.strip_prefix('/')?;
    if tail.is_empty() {
        return None;
    }
    Some((name, index, tail))
}

fn get_rec(table: &Table, instance: &dyn Any, path: &str) -> Option<Value> {
    let (name, index, rest) = split_segment(path)?;
    let position = table.find_index(name_hash(name))?;
    let entry = table.action(position);

    match index {
        SegIndex::Count => {
            let driver = entry.list_driver()?;
            if !rest.is_empty() {
                return None;
            }
            return Some(Value::Int(i32::try_from(driver.count(instance)).ok()?));
        }
        SegIndex::At(_) if entry.list_driver().is_none() => return None,
        SegIndex::None if entry.list_driver().is_some() => return None,
        _ => {}
    }
    let index = match index {
        SegIndex::At(i) => i,
        _ => LIST_END,
    };

    match entry.dispatch() {
        Dispatch::Nested(nested) => {
            if rest.is_empty() {
                return None;
            }
            let (sub, sub_instance) = (nested.descend)(instance, index)?;
            get_rec(sub, sub_instance, rest)
        }
        dispatch => {
            if !rest.is_empty() {
                return None;
            }
            dispatch.read_value(instance, index)
        }
    }
}

fn set_rec(table: &Table, instance: &mut dyn Any, path: &str, value: &Value) -> bool {
    let Some((name, index, rest)) = split_segment(path) else {
        return false;
    };
    let Some(position) = table.find_index(name_hash(name)) else {
        return false;
    };
    let entry = table.action(position);

    // Effective flags gate writes at every level, so a read-only nested
    // scope shields its whole subtree.
    if entry
        .flags()
        .effective(&*instance)
        .contains(Flags::READ_ONLY)
    {
        return false;
    }

    match index {
        SegIndex::Count => {
            let Some(driver) = entry.list_driver() else {
                return false;
            };
            if !rest.is_empty() {
                return false;
            }
            let Value::Int(count) = value else {
                return false;
            };
            let Ok(count) = u64::try_from(*count) else {
                return false;
            };
            driver.resize(instance, count);
            true
        }
        SegIndex::At(_) if entry.list_driver().is_none() => false,
        SegIndex::None if entry.list_driver().is_some() => false,
        index => {
            let index = match index {
                SegIndex::At(i) => i,
                _ => LIST_END,
            };
            match entry.dispatch() {
                Dispatch::Nested(nested) => {
                    if rest.is_empty() {
                        return false;
                    }
                    match (nested.descend_mut)(instance, index) {
                        Some((sub, sub_instance)) => set_rec(sub, sub_instance, rest, value),
                        None => false,
                    }
                }
                dispatch => {
                    if !rest.is_empty() {
                        return false;
                    }
                    dispatch.write_value(instance, index, value)
                }
            }
        }
    }
}
