//! Table binding: how an instance leads to its table.
//!
//! Two styles, mirroring the two ways collaborators hold objects:
//!
//! - **Static** (`Describe`): the table is reached through the type itself.
//!   No common base, no registry - the trait impl *is* the compile-time
//!   registry entry.
//! - **Virtual** (`Reflect`): an object-safe accessor for code that only
//!   holds a `&dyn Reflect`. A type may implement both; `Reflect` impls
//!   usually just forward to `Self::table()`.
//!
//! Tables are built on first use and never torn down. `TableCell` is the
//! done-once guard; after initialization it is a plain immutable read, safe
//! for unsynchronized concurrent callers.

use std::any::Any;
use std::sync::OnceLock;

use lazy_static::lazy_static;

use crate::error::TableError;
use crate::table::Table;

/// Static binding: the type knows its table.
pub trait Describe: Any {
    fn table() -> &'static Table;
}

/// Virtual binding: the instance knows its table.
///
/// `Any` is a supertrait so the dispatch layer can recover the concrete
/// instance behind a `&dyn Reflect`.
pub trait Reflect: Any {
    fn property_table(&self) -> &'static Table;
}

/// Done-once storage for a type's table.
///
/// ```rust
/// use propkit_table::{Describe, Field, Table, TableBuilder, TableCell};
///
/// struct Probe { value: i32 }
///
/// impl Describe for Probe {
///     fn table() -> &'static Table {
///         static TABLE: TableCell = TableCell::new();
///         TABLE.get_or_build(|| {
///             TableBuilder::<Probe>::named("Probe")
///                 .field(Field::value("Value", |p: &Probe| &p.value, |p: &mut Probe| &mut p.value))
///                 .build()
///         })
///     }
/// }
/// ```
///
/// A build error is a schema bug and panics here: construction problems must
/// surface at registration, never later.
pub struct TableCell(OnceLock<Table>);

impl TableCell {
    pub const fn new() -> Self {
        TableCell(OnceLock::new())
    }

    pub fn get_or_build(&self, build: impl FnOnce() -> Result<Table, TableError>) -> &Table {
        self.0.get_or_init(|| match build() {
            Ok(table) => table,
            Err(e) => panic!("property table construction failed: {}", e),
        })
    }
}

impl Default for TableCell {
    fn default() -> Self {
        TableCell::new()
    }
}

lazy_static! {
    static ref EMPTY: Table =
        Table::assemble(None, Vec::new()).expect("the empty table has no entries to collide");
}

static EMPTY_UNIT: () = ();

/// The shared table with zero properties. Absent owned objects redirect
/// here, so their subtree enumerates to nothing instead of failing.
pub fn empty_table() -> &'static Table {
    &EMPTY
}

/// The instance paired with `empty_table()` on read-side redirection.
pub fn empty_instance() -> &'static dyn Any {
    &EMPTY_UNIT
}
