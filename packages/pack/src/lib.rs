//! The pack codec: compact relative-addressed property batches.
//!
//! A `Pack` is the serialize enumeration of one instance with the path
//! strings replaced by `(name-hash, index)` segments on a shared path
//! stack. Consecutive entries share their path prefix; each entry only
//! records how many stack segments to pop before its own segments apply.
//! Applying a pack therefore costs about one hash lookup per property,
//! with no string parsing and no restart from the root.
//!
//! Packs are schema-bound: the first path segment is the encoding table's
//! name hash, and `apply_pack` refuses a pack whose root hash does not
//! match the target table before touching the instance.

mod codec;

pub use codec::{apply_pack, encode_pack};

use serde::{Deserialize, Serialize};

use propkit_core::Value;

/// One segment of the shared path stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSeg {
    /// Property name hash (table name hash for the root segment).
    pub key: u32,
    /// List element index, or `LIST_END` outside lists.
    pub index: u64,
}

/// One value in a pack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackEntry {
    /// The property value.
    pub value: Value,
    /// Path-stack segments to discard before this entry's segments apply.
    pub pop: u8,
    /// Whether this entry is a list count, applied as `WriteCount` so the
    /// container can pre-size before its elements arrive.
    pub is_count: bool,
}

/// A compact, relative-addressed batch of properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    /// The shared path stack, in push order.
    pub paths: Vec<PathSeg>,
    /// Values in traversal order.
    pub entries: Vec<PackEntry>,
}

impl Pack {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
