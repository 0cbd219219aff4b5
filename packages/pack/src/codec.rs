//! Pack encode and apply.

use std::any::Any;

use propkit_core::{Flags, Value};
use propkit_table::{Dispatch, ListScratch, Table, LIST_END};

use crate::{Pack, PackEntry, PathSeg};

/// Encode every save-included property of an instance.
///
/// The walk is the serialize enumeration: declaration order, dynamic flags
/// evaluated fresh, `DONT_SAVE` entries skipped, empty lists and empty
/// nested subtrees omitted entirely.
pub fn encode_pack(table: &Table, instance: &dyn Any) -> Pack {
    let mut pack = Pack::default();
    if table.is_empty() {
        return pack;
    }
    pack.paths.push(PathSeg {
        key: table.name_hash(),
        index: LIST_END,
    });
    let mut pending = 0u8;
    encode_rec(table, instance, &mut pack, &mut pending);
    // Pops pending after the last entry have nothing left to apply to.
    pack
}

fn encode_rec(table: &Table, instance: &dyn Any, pack: &mut Pack, pending: &mut u8) {
    for position in 0..table.len() {
        let entry = table.action(position);
        let flags = entry.flags().effective(instance);
        if flags.contains(Flags::DONT_SAVE) {
            continue;
        }

        match entry.list_driver() {
            Some(driver) => {
                let count = driver.count(instance);
                if count == 0 {
                    continue;
                }
                pack.paths.push(PathSeg {
                    key: table.user(position).name_hash(),
                    index: LIST_END,
                });
                pack.entries.push(PackEntry {
                    value: Value::Int(count as i32),
                    pop: std::mem::take(pending),
                    is_count: true,
                });

                let mut scratch = ListScratch::default();
                let mut cursor = driver.first(instance, &mut scratch);
                while cursor != LIST_END {
                    encode_one(table, position, instance, cursor, pack, pending);
                    cursor = driver.next(instance, &mut scratch, cursor);
                }
            }
            None => encode_one(table, position, instance, LIST_END, pack, pending),
        }
    }
}

fn encode_one(
    table: &Table,
    position: usize,
    instance: &dyn Any,
    index: u64,
    pack: &mut Pack,
    pending: &mut u8,
) {
    let entry = table.action(position);
    let key = table.user(position).name_hash();

    match entry.dispatch() {
        Dispatch::Nested(nested) => {
            let Some((sub, sub_instance)) = (nested.descend)(instance, index) else {
                return;
            };
            let path_mark = pack.paths.len();
            let entry_mark = pack.entries.len();
            pack.paths.push(PathSeg { key, index });
            encode_rec(sub, sub_instance, pack, pending);
            if pack.entries.len() == entry_mark {
                // Nothing underneath. Drop the dangling scope segment so the
                // decoder's path cursor only ever sees consumed segments.
                pack.paths.truncate(path_mark);
            } else {
                *pending += 1;
            }
        }
        dispatch => {
            let Some(value) = dispatch.read_value(instance, index) else {
                return;
            };
            pack.paths.push(PathSeg { key, index });
            pack.entries.push(PackEntry {
                value,
                pop: std::mem::take(pending),
                is_count: false,
            });
        }
    }
}

/// Apply a pack to an instance of the encoding schema.
///
/// The root hash is verified before anything is written, so a pack for the
/// wrong schema fails with zero side effects. Past that boundary the walk
/// is sequential: pop counts re-synchronize the `(table, instance)` cursor,
/// count entries pre-size their list, elements apply positionally.
///
/// Dynamic flags are honored the same way `set` honors them: a scalar or
/// count entry whose effective flags are read-only at apply time is
/// skipped, and the rest of the batch still applies. A pack that cannot
/// stay synchronized (unknown hash, unenterable subtree, truncated path
/// stack) returns `false`, possibly after earlier entries were applied.
pub fn apply_pack(table: &Table, instance: &mut dyn Any, pack: &Pack) -> bool {
    if pack.entries.is_empty() {
        return true;
    }
    match pack.paths.first() {
        Some(root) if root.key == table.name_hash() => {}
        _ => {
            tracing::warn!(
                expected = table.name_hash(),
                "pack root does not match the target table"
            );
            return false;
        }
    }

    let mut ientry = 0usize;
    let mut ipath = 1usize;
    apply_rec(table, instance, pack, &mut ientry, &mut ipath).is_some()
}

/// Applies entries until the pack is exhausted or an entry's pop count
/// unwinds past this level. `Some(n)` asks the caller to unwind `n` more
/// levels; `None` is a desynchronized (malformed or mismatched) pack.
fn apply_rec(
    table: &Table,
    instance: &mut dyn Any,
    pack: &Pack,
    ientry: &mut usize,
    ipath: &mut usize,
) -> Option<u8> {
    loop {
        let seg = *pack.paths.get(*ipath)?;
        let position = table.find_index(seg.key)?;
        let entry = table.action(position);
        let pack_entry = &pack.entries[*ientry];
        let flags = entry.flags().effective(&*instance);

        let mut descended = false;
        if entry.list_driver().is_some() && pack_entry.is_count {
            if flags.contains(Flags::READ_ONLY) {
                tracing::trace!(hash = seg.key, "read-only list count skipped");
            } else if let Value::Int(count) = pack_entry.value {
                if let Ok(count) = u64::try_from(count) {
                    if let Some(driver) = entry.list_driver() {
                        driver.resize(instance, count);
                    }
                }
            }
        } else {
            match entry.dispatch() {
                Dispatch::Nested(nested) => {
                    *ipath += 1;
                    let (sub, sub_instance) = (nested.descend_mut)(&mut *instance, seg.index)?;
                    let pops = apply_rec(sub, sub_instance, pack, ientry, ipath)?;
                    if pops > 0 {
                        return Some(pops - 1);
                    }
                    descended = true;
                }
                dispatch => {
                    if flags.contains(Flags::READ_ONLY) {
                        tracing::trace!(hash = seg.key, "read-only entry skipped");
                    } else {
                        // A rejected scalar write leaves the cursor
                        // consistent; nothing to unwind.
                        let _ = dispatch.write_value(&mut *instance, seg.index, &pack_entry.value);
                    }
                }
            }
        }

        if descended {
            if *ientry == pack.entries.len() {
                return Some(0);
            }
            continue;
        }

        *ientry += 1;
        if *ientry == pack.entries.len() {
            return Some(0);
        }
        *ipath += 1;
        let next_pop = pack.entries[*ientry].pop;
        if next_pop > 0 {
            return Some(next_pop - 1);
        }
    }
}
