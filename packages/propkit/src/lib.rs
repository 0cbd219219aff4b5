//! propkit: a reflection/property system.
//!
//! Any structured type registers a per-type immutable metadata table once,
//! at startup, and from then on external code can read, write, enumerate,
//! and bulk-copy its fields without the type hand-writing any of that
//! logic.
//!
//! The whole contract is six operations:
//!
//! - [`get`] / [`set`] - resolve one `Table/Nested/Field[3]` path string.
//! - [`enumerate_display`] / [`enumerate_serialize`] - depth-first walk
//!   producing `(path, value, metadata)` records.
//! - [`encode_pack`] / [`apply_pack`] - compact relative-addressed batch
//!   copy between instances of the same schema.
//!
//! # Registering a type
//!
//! ```rust
//! use propkit::{Describe, Field, Table, TableBuilder, TableCell, Value};
//!
//! struct Motor {
//!     rpm: i32,
//!     label: String,
//! }
//!
//! impl Describe for Motor {
//!     fn table() -> &'static Table {
//!         static TABLE: TableCell = TableCell::new();
//!         TABLE.get_or_build(|| {
//!             TableBuilder::<Motor>::named("Motor")
//!                 .field(Field::value("Rpm", |m: &Motor| &m.rpm, |m: &mut Motor| &mut m.rpm))
//!                 .field(Field::value("Label", |m: &Motor| &m.label, |m: &mut Motor| &mut m.label)
//!                     .help("Nameplate text"))
//!                 .build()
//!         })
//!     }
//! }
//!
//! let mut motor = Motor { rpm: 0, label: String::new() };
//! assert!(propkit::set(Motor::table(), &mut motor, "Motor/Rpm", &Value::Int(10)));
//! assert_eq!(propkit::get(Motor::table(), &motor, "Motor/Rpm"), Some(Value::Int(10)));
//! ```

pub use propkit_core::{name_hash, Flags, Scalar, TypeTag, Value, HASH_SEED};
pub use propkit_pack::{apply_pack, encode_pack, Pack, PackEntry, PathSeg};
pub use propkit_query::{
    enumerate_display, enumerate_serialize, get, serialize_entries, set, Visit, WalkMode,
};
pub use propkit_table::{
    empty_instance, empty_table, ActionEntry, Describe, Dispatch, DispatchScalar, Field,
    FlagSource, ListCmd, ListDriver, ListScratch, NestedAccess, Reflect, ScalarAccess, Table,
    TableBuilder, TableCell, TableError, UserEntry, LIST_END,
};
