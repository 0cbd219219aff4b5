//! Path-addressed property access and enumeration.
//!
//! Two consumers of the dispatch layer live here:
//! - `get`/`set`: resolve one slash/bracket path string to one property.
//! - `walk` and the `enumerate_*` wrappers: visit every reachable property
//!   depth-first, producing `(path, value, metadata)` records for a UI or a
//!   serializer.
//!
//! Path grammar: segments separated by `/`; `name[3]` addresses a list
//! element; `name[]` addresses the list's count pseudo-property and is only
//! valid as the final segment. A named root table contributes a mandatory
//! leading `TableName/` prefix.

mod resolve;
mod walk;

pub use resolve::{get, set};
pub use walk::{enumerate_display, enumerate_serialize, serialize_entries, Visit, WalkMode};
