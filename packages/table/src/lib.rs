//! Property tables: per-type immutable metadata.
//!
//! A `Table` is built once per type through `TableBuilder`, lives for the
//! process lifetime, and is safe for unsynchronized concurrent readers. It
//! holds two parallel entry arrays - `ActionEntry` (dispatch machinery) and
//! `UserEntry` (display metadata) - plus an open-addressed hash index over
//! property name hashes.
//!
//! Field access goes through typed accessor closures captured at
//! registration, never through offsets or raw pointers. The instance crosses
//! the dispatch boundary as `&dyn Any` / `&mut dyn Any` and each accessor
//! downcasts back to the concrete type it was registered for.
//!
//! # Example
//!
//! ```rust
//! use propkit_table::{Describe, Field, Table, TableBuilder, TableCell};
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
//!                 .field(Field::value("Label", |m: &Motor| &m.label, |m: &mut Motor| &mut m.label))
//!                 .build()
//!         })
//!     }
//! }
//!
//! let table = Motor::table();
//! assert_eq!(table.len(), 2);
//! ```

mod access;
mod builder;
mod describe;
mod entry;
mod error;
mod list;
mod table;

pub use access::{
    DescendFn, DescendMutFn, Dispatch, DispatchScalar, NestedAccess, ReadFn, ScalarAccess, WriteFn,
};
pub use builder::{Field, TableBuilder};
pub use describe::{empty_instance, empty_table, Describe, Reflect, TableCell};
pub use entry::{ActionEntry, DynamicFlagsFn, FlagSource, UserEntry};
pub use error::TableError;
pub use list::{ListCmd, ListDriver, ListFn, ListResizeFn, ListScratch, LIST_END};
pub use table::{Table, INDEX_FACTOR};

// Re-export core types for convenience
pub use propkit_core::{name_hash, Flags, Scalar, TypeTag, Value};
