//! The enumerator: a depth-first walk over every reachable property.

use std::any::Any;
use std::fmt::Write as _;

use propkit_core::{Flags, Value};
use propkit_table::{Dispatch, ListScratch, Table, LIST_END};

/// What the walk is feeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkMode {
    /// For a UI: skips `DONT_SHOW`, emits synthetic scope records so the
    /// consumer can render group headers.
    Display,
    /// For a serializer: skips `DONT_SAVE`, emits no scope records.
    Serialize,
}

/// One record of the enumeration stream.
pub struct Visit<'w> {
    /// Full path of the property, built in the walk's reusable buffer.
    pub path: &'w str,
    /// The property value. `None` on synthetic scope records.
    pub value: Option<Value>,
    /// The table owning the entry.
    pub table: &'w Table,
    /// The entry's declaration position in `table`.
    pub entry_index: usize,
    /// Effective flags, with `SCOPE` added on scope records.
    pub flags: Flags,
}

/// Incrementally built path. One allocation per walk; every push is undone
/// by truncating back to a mark.
struct PathBuffer {
    buf: String,
}

impl PathBuffer {
    fn new() -> Self {
        PathBuffer {
            buf: String::with_capacity(256),
        }
    }

    fn mark(&self) -> usize {
        self.buf.len()
    }

    fn rewind(&mut self, mark: usize) {
        self.buf.truncate(mark);
    }

    fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    fn push_indexed(&mut self, name: &str, index: u64) {
        if index == LIST_END {
            self.buf.push_str(name);
        } else {
            let _ = write!(self.buf, "{}[{}]", name, index);
        }
    }

    fn as_str(&self) -> &str {
        &self.buf
    }
}

/// Enumerate for display.
pub fn enumerate_display(table: &Table, instance: &dyn Any, mut visitor: impl FnMut(Visit<'_>)) {
    walk(table, instance, WalkMode::Display, &mut visitor);
}

/// Enumerate for serialization.
pub fn enumerate_serialize(table: &Table, instance: &dyn Any, mut visitor: impl FnMut(Visit<'_>)) {
    walk(table, instance, WalkMode::Serialize, &mut visitor);
}

/// Collect the serialize stream as owned `(path, value)` entries, ready to
/// replay through `set`.
pub fn serialize_entries(table: &Table, instance: &dyn Any) -> Vec<(String, Value)> {
    let mut entries = Vec::new();
    enumerate_serialize(table, instance, |visit| {
        if let Some(value) = visit.value {
            entries.push((visit.path.to_string(), value));
        }
    });
    entries
}

fn walk(table: &Table, instance: &dyn Any, mode: WalkMode, visitor: &mut dyn FnMut(Visit<'_>)) {
    let mut path = PathBuffer::new();
    if let Some(name) = table.name() {
        path.push(name);
        path.push("/");
    }
    walk_rec(table, instance, mode, &mut path, visitor);
}

fn walk_rec(
    table: &Table,
    instance: &dyn Any,
    mode: WalkMode,
    path: &mut PathBuffer,
    visitor: &mut dyn FnMut(Visit<'_>),
) {
    for position in 0..table.len() {
        let entry = table.action(position);
        let user = table.user(position);
        // Never cached: dynamic flags are re-evaluated on every walk.
        let flags = entry.flags().effective(instance);
        let skip = match mode {
            WalkMode::Display => flags.contains(Flags::DONT_SHOW),
            WalkMode::Serialize => flags.contains(Flags::DONT_SAVE),
        };
        if skip {
            tracing::trace!(property = user.name(), "skipped by flags");
            continue;
        }

        match entry.list_driver() {
            Some(driver) => {
                let mut scratch = ListScratch::default();
                let count = driver.count(instance);
                if count != 0 {
                    // The count pseudo-property leads its list. In display
                    // mode it doubles as the list's group header.
                    let mark = path.mark();
                    path.push(user.name());
                    path.push("[]");
                    let count_flags = match mode {
                        WalkMode::Display => flags | Flags::SCOPE,
                        WalkMode::Serialize => flags,
                    };
                    visitor(Visit {
                        path: path.as_str(),
                        value: Some(Value::Int(count as i32)),
                        table,
                        entry_index: position,
                        flags: count_flags,
                    });
                    path.rewind(mark);
                }

                let mut cursor = driver.first(instance, &mut scratch);
                while cursor != LIST_END {
                    emit(table, position, instance, cursor, mode, path, visitor);
                    cursor = driver.next(instance, &mut scratch, cursor);
                }
            }
            None => emit(table, position, instance, LIST_END, mode, path, visitor),
        }
    }
}

fn emit(
    table: &Table,
    position: usize,
    instance: &dyn Any,
    index: u64,
    mode: WalkMode,
    path: &mut PathBuffer,
    visitor: &mut dyn FnMut(Visit<'_>),
) {
    let entry = table.action(position);
    let user = table.user(position);
    let flags = entry.flags().effective(instance);
    let mark = path.mark();

    match entry.dispatch() {
        Dispatch::Nested(nested) => {
            let Some((sub, sub_instance)) = (nested.descend)(instance, index) else {
                return;
            };
            path.push_indexed(user.name(), index);
            if mode == WalkMode::Display && index == LIST_END {
                // Scope header so a UI can render the group. List elements
                // are already grouped under their count record.
                visitor(Visit {
                    path: path.as_str(),
                    value: None,
                    table,
                    entry_index: position,
                    flags: flags | Flags::SCOPE,
                });
            }
            path.push("/");
            walk_rec(sub, sub_instance, mode, path, visitor);
            path.rewind(mark);
        }
        dispatch => {
            let Some(value) = dispatch.read_value(instance, index) else {
                return;
            };
            path.push_indexed(user.name(), index);
            visitor(Visit {
                path: path.as_str(),
                value: Some(value),
                table,
                entry_index: position,
                flags,
            });
            path.rewind(mark);
        }
    }
}
