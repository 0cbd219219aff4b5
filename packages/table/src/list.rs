//! List iteration drivers.
//!
//! Every list-like property exposes the same four-command protocol:
//! `ReadCount`, `WriteCount`, `ReadFirst`, `ReadNext`. The driver owns no
//! state between commands; the cursor lives in the caller's `u64` and a
//! small fixed scratch block, so drivers over non-trivial containers
//! (ordered maps, intrusive lists) can keep an iterator position in place
//! without heap allocation.
//!
//! `ReadFirst`/`ReadNext` park the cursor at `LIST_END` when the list is
//! exhausted. `WriteCount` resizes growable containers and is a no-op for
//! fixed-capacity ones.

use std::any::Any;

/// Cursor value meaning "past the end". Reserved out of the index domain.
pub const LIST_END: u64 = u64::MAX;

/// The list protocol commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListCmd {
    /// Write the total entry count into the cursor slot.
    ReadCount,
    /// Resize the container to the cursor value. Fixed-capacity containers
    /// ignore it.
    WriteCount,
    /// Park the cursor on entry 0, or `LIST_END` if the list is empty.
    ReadFirst,
    /// Advance the cursor, parking it at `LIST_END` past the last entry.
    ReadNext,
}

/// Fixed scratch block a driver may use to keep iterator state across
/// `ReadFirst`/`ReadNext` calls. Stack-local per walk, so drivers are
/// reentrant.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListScratch(pub [u64; 4]);

/// Read-side driver closure: handles `ReadCount`, `ReadFirst`, `ReadNext`.
pub type ListFn = Box<dyn for<'a> Fn(&'a dyn Any, ListCmd, &mut u64, &mut ListScratch) + Send + Sync>;

/// Write-side driver closure: handles `WriteCount`.
pub type ListResizeFn = Box<dyn for<'a> Fn(&'a mut dyn Any, u64) + Send + Sync>;

/// The iteration driver of one list property.
///
/// The protocol is one state machine; the closure split mirrors the
/// read/write borrow split of the dispatch layer: the three read commands
/// go through `drive`, `WriteCount` through `write_count`.
pub struct ListDriver {
    pub drive: ListFn,
    pub write_count: ListResizeFn,
}

impl ListDriver {
    /// Total entry count.
    pub fn count(&self, instance: &dyn Any) -> u64 {
        let mut out = 0u64;
        let mut scratch = ListScratch::default();
        (self.drive)(instance, ListCmd::ReadCount, &mut out, &mut scratch);
        out
    }

    /// Park a cursor on the first entry.
    pub fn first(&self, instance: &dyn Any, scratch: &mut ListScratch) -> u64 {
        let mut cursor = LIST_END;
        (self.drive)(instance, ListCmd::ReadFirst, &mut cursor, scratch);
        cursor
    }

    /// Advance a cursor.
    pub fn next(&self, instance: &dyn Any, scratch: &mut ListScratch, current: u64) -> u64 {
        let mut cursor = current;
        (self.drive)(instance, ListCmd::ReadNext, &mut cursor, scratch);
        cursor
    }

    /// Issue `WriteCount`.
    pub fn resize(&self, instance: &mut dyn Any, count: u64) {
        (self.write_count)(instance, count)
    }
}

pub(crate) fn list_fn<F>(f: F) -> ListFn
where
    F: for<'a> Fn(&'a dyn Any, ListCmd, &mut u64, &mut ListScratch) + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) fn resize_fn<F>(f: F) -> ListResizeFn
where
    F: for<'a> Fn(&'a mut dyn Any, u64) + Send + Sync + 'static,
{
    Box::new(f)
}

/// Drive an indexable container of known length. Shared by the vector and
/// fixed-array field constructors; the scratch block is unused because the
/// cursor is the index itself.
pub(crate) fn drive_indexed(len: u64, cmd: ListCmd, cursor: &mut u64) {
    match cmd {
        ListCmd::ReadCount => *cursor = len,
        ListCmd::ReadFirst => *cursor = if len == 0 { LIST_END } else { 0 },
        ListCmd::ReadNext => {
            *cursor += 1;
            if *cursor >= len {
                *cursor = LIST_END;
            }
        }
        ListCmd::WriteCount => debug_assert!(false, "WriteCount is routed through write_count"),
    }
}
