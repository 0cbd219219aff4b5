//! The registration surface: `TableBuilder` and `Field`.
//!
//! A type declares its properties once, at startup, with a fluent builder:
//!
//! ```rust
//! use propkit_table::{Field, Flags, TableBuilder};
//!
//! struct Motor {
//!     rpm: i32,
//!     label: String,
//!     gears: Vec<i32>,
//! }
//!
//! let table = TableBuilder::<Motor>::named("Motor")
//!     .field(Field::value("Rpm", |m: &Motor| &m.rpm, |m: &mut Motor| &mut m.rpm)
//!         .help("Shaft speed in revolutions per minute"))
//!     .field(Field::value("Label", |m: &Motor| &m.label, |m: &mut Motor| &mut m.label)
//!         .flags(Flags::READ_ONLY))
//!     .field(Field::list("Gears", |m: &Motor| &m.gears, |m: &mut Motor| &mut m.gears))
//!     .build()
//!     .unwrap();
//! assert_eq!(table.len(), 3);
//! ```
//!
//! Each `Field` constructor captures typed projections into the owning type
//! and erases them into the dispatch closures the rest of the system runs
//! on. Name hashing happens in `build()`, so `rename` composes with every
//! constructor.

use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use propkit_core::{name_hash, Flags};

use crate::access::{
    descend_fn, descend_mut_fn, read_fn, write_fn, Dispatch, DispatchScalar, NestedAccess,
    ScalarAccess,
};
use crate::describe::{empty_instance, empty_table, Describe, Reflect};
use crate::entry::{ActionEntry, DynamicFlagsFn, FlagSource, UserEntry};
use crate::error::TableError;
use crate::list::{drive_indexed, list_fn, resize_fn, ListDriver};
use crate::table::Table;

/// Builds one property table for type `I`.
pub struct TableBuilder<I: Any> {
    name: Option<String>,
    fields: Vec<Field<I>>,
}

impl<I: Any> TableBuilder<I> {
    /// Begin a named table. The name becomes the root path prefix and the
    /// pack consistency key.
    pub fn named(name: impl Into<String>) -> Self {
        TableBuilder {
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    /// Begin an anonymous table. Paths carry no root prefix.
    pub fn anonymous() -> Self {
        TableBuilder {
            name: None,
            fields: Vec::new(),
        }
    }

    /// Append one field declaration.
    pub fn field(mut self, field: Field<I>) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate names, hash them, and assemble the immutable table.
    pub fn build(self) -> Result<Table, TableError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        let mut entries = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            if let Some(error) = field.error {
                return Err(error);
            }
            validate_name(&field.name)?;
            let user = UserEntry {
                name_hash: name_hash(&field.name),
                name: field.name,
                help: field.help,
                meta: field.meta,
            };
            let flags = match field.dynamic {
                Some(f) => FlagSource::Dynamic(f),
                None => FlagSource::Static(field.flags),
            };
            entries.push((
                ActionEntry {
                    flags,
                    dispatch: field.dispatch,
                    lists: field.lists,
                },
                user,
            ));
        }
        Table::assemble(self.name, entries)
    }
}

/// One field declaration, produced by the typed constructors below and
/// refined by the chained modifiers.
pub struct Field<I: Any> {
    name: String,
    help: Option<String>,
    meta: BTreeMap<String, String>,
    flags: Flags,
    dynamic: Option<DynamicFlagsFn>,
    dispatch: Dispatch,
    lists: Option<ListDriver>,
    error: Option<TableError>,
    _marker: PhantomData<fn(I)>,
}

impl<I: Any> Field<I> {
    fn raw(name: String, dispatch: Dispatch, lists: Option<ListDriver>) -> Self {
        Field {
            name,
            help: None,
            meta: BTreeMap::new(),
            flags: Flags::empty(),
            dynamic: None,
            dispatch,
            lists,
            error: None,
            _marker: PhantomData,
        }
    }

    /// Placeholder dispatch for declarations that already failed; `build()`
    /// surfaces the stored error before it can be reached.
    fn dead_nested() -> Dispatch {
        Dispatch::Nested(NestedAccess {
            descend: descend_fn(|_inst: &dyn Any, _index| None),
            descend_mut: descend_mut_fn(|_inst: &mut dyn Any, _index| None),
        })
    }

    // === Constructors ===

    /// A plain scalar field backed by a pair of projections.
    pub fn value<S, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        S: DispatchScalar,
        R: Fn(&I) -> &S + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut S + Send + Sync + 'static,
    {
        let read = read_fn(move |inst: &dyn Any, _index| {
            inst.downcast_ref::<I>().map(|i| get(i).clone())
        });
        let write = write_fn(move |inst: &mut dyn Any, _index, v: &S| {
            match inst.downcast_mut::<I>() {
                Some(i) => {
                    *set(i) = v.clone();
                    true
                }
                None => false,
            }
        });
        Self::raw(name.into(), S::dispatch(ScalarAccess { read, write }), None)
    }

    /// A computed scalar: no backing storage, the closures are the property.
    /// The setter may reject a value by returning `false`.
    pub fn computed<S, G, T>(name: impl Into<String>, get: G, set: T) -> Self
    where
        S: DispatchScalar,
        G: Fn(&I) -> S + Send + Sync + 'static,
        T: Fn(&mut I, S) -> bool + Send + Sync + 'static,
    {
        let read = read_fn(move |inst: &dyn Any, _index| inst.downcast_ref::<I>().map(|i| get(i)));
        let write = write_fn(move |inst: &mut dyn Any, _index, v: &S| {
            inst.downcast_mut::<I>()
                .map(|i| set(i, v.clone()))
                .unwrap_or(false)
        });
        Self::raw(name.into(), S::dispatch(ScalarAccess { read, write }), None)
    }

    /// A growable list of scalars. `WriteCount` resizes, default-filling new
    /// slots.
    pub fn list<S, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        S: DispatchScalar + Default,
        R: Fn(&I) -> &Vec<S> + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut Vec<S> + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        let set = Arc::new(set);

        let read = {
            let get = get.clone();
            read_fn(move |inst: &dyn Any, index| {
                let i = inst.downcast_ref::<I>()?;
                (*get)(i).get(index as usize).cloned()
            })
        };
        let write = {
            let set = set.clone();
            write_fn(move |inst: &mut dyn Any, index, v: &S| {
                match inst.downcast_mut::<I>() {
                    Some(i) => match (*set)(i).get_mut(index as usize) {
                        Some(slot) => {
                            *slot = v.clone();
                            true
                        }
                        None => false,
                    },
                    None => false,
                }
            })
        };
        let drive = list_fn(move |inst: &dyn Any, cmd, cursor, _scratch| {
            let len = inst.downcast_ref::<I>().map_or(0, |i| (*get)(i).len() as u64);
            drive_indexed(len, cmd, cursor);
        });
        let write_count = resize_fn(move |inst: &mut dyn Any, count| {
            if let Some(i) = inst.downcast_mut::<I>() {
                (*set)(i).resize(count as usize, S::default());
            }
        });
        Self::raw(
            name.into(),
            S::dispatch(ScalarAccess { read, write }),
            Some(ListDriver { drive, write_count }),
        )
    }

    /// A fixed-capacity list of scalars (array or slice). `WriteCount` is a
    /// no-op.
    pub fn array<S, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        S: DispatchScalar,
        R: Fn(&I) -> &[S] + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut [S] + Send + Sync + 'static,
    {
        let get = Arc::new(get);

        let read = {
            let get = get.clone();
            read_fn(move |inst: &dyn Any, index| {
                let i = inst.downcast_ref::<I>()?;
                (*get)(i).get(index as usize).cloned()
            })
        };
        let write = write_fn(move |inst: &mut dyn Any, index, v: &S| {
            match inst.downcast_mut::<I>() {
                Some(i) => match set(i).get_mut(index as usize) {
                    Some(slot) => {
                        *slot = v.clone();
                        true
                    }
                    None => false,
                },
                None => false,
            }
        });
        let drive = list_fn(move |inst: &dyn Any, cmd, cursor, _scratch| {
            let len = inst.downcast_ref::<I>().map_or(0, |i| (*get)(i).len() as u64);
            drive_indexed(len, cmd, cursor);
        });
        let write_count = resize_fn(move |_inst: &mut dyn Any, _count| {});
        Self::raw(
            name.into(),
            S::dispatch(ScalarAccess { read, write }),
            Some(ListDriver { drive, write_count }),
        )
    }

    /// A computed list: element access and the entry count all come from
    /// closures. The count is fixed from the protocol's point of view, so
    /// `WriteCount` is a no-op.
    pub fn computed_list<S, C, G, T>(name: impl Into<String>, count: C, get: G, set: T) -> Self
    where
        S: DispatchScalar,
        C: Fn(&I) -> u64 + Send + Sync + 'static,
        G: Fn(&I, u64) -> Option<S> + Send + Sync + 'static,
        T: Fn(&mut I, u64, S) -> bool + Send + Sync + 'static,
    {
        let read = read_fn(move |inst: &dyn Any, index| {
            let i = inst.downcast_ref::<I>()?;
            get(i, index)
        });
        let write = write_fn(move |inst: &mut dyn Any, index, v: &S| {
            inst.downcast_mut::<I>()
                .map(|i| set(i, index, v.clone()))
                .unwrap_or(false)
        });
        let drive = list_fn(move |inst: &dyn Any, cmd, cursor, _scratch| {
            let len = inst.downcast_ref::<I>().map_or(0, |i| count(i));
            drive_indexed(len, cmd, cursor);
        });
        let write_count = resize_fn(move |_inst: &mut dyn Any, _count| {});
        Self::raw(
            name.into(),
            S::dispatch(ScalarAccess { read, write }),
            Some(ListDriver { drive, write_count }),
        )
    }

    /// An embedded object whose type carries its own table.
    pub fn nested<T, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        T: Describe,
        R: Fn(&I) -> &T + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut T + Send + Sync + 'static,
    {
        let descend = descend_fn(move |inst: &dyn Any, _index| {
            let i = inst.downcast_ref::<I>()?;
            Some((T::table(), get(i) as &dyn Any))
        });
        let descend_mut = descend_mut_fn(move |inst: &mut dyn Any, _index| {
            let i = inst.downcast_mut::<I>()?;
            Some((T::table(), set(i) as &mut dyn Any))
        });
        Self::raw(
            name.into(),
            Dispatch::Nested(NestedAccess {
                descend,
                descend_mut,
            }),
            None,
        )
    }

    /// A growable list of embedded objects.
    pub fn nested_list<T, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        T: Describe + Default,
        R: Fn(&I) -> &Vec<T> + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut Vec<T> + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        let set = Arc::new(set);

        let descend = {
            let get = get.clone();
            descend_fn(move |inst: &dyn Any, index| {
                let i = inst.downcast_ref::<I>()?;
                let item = (*get)(i).get(index as usize)?;
                Some((T::table(), item as &dyn Any))
            })
        };
        let descend_mut = {
            let set = set.clone();
            descend_mut_fn(move |inst: &mut dyn Any, index| {
                let i = inst.downcast_mut::<I>()?;
                let item = (*set)(i).get_mut(index as usize)?;
                Some((T::table(), item as &mut dyn Any))
            })
        };
        let drive = list_fn(move |inst: &dyn Any, cmd, cursor, _scratch| {
            let len = inst.downcast_ref::<I>().map_or(0, |i| (*get)(i).len() as u64);
            drive_indexed(len, cmd, cursor);
        });
        let write_count = resize_fn(move |inst: &mut dyn Any, count| {
            if let Some(i) = inst.downcast_mut::<I>() {
                (*set)(i).resize_with(count as usize, T::default);
            }
        });
        Self::raw(
            name.into(),
            Dispatch::Nested(NestedAccess {
                descend,
                descend_mut,
            }),
            Some(ListDriver { drive, write_count }),
        )
    }

    /// An owned, possibly absent object (`Option<Box<T>>`, `Rc`, `Arc`,
    /// ...). An absent object redirects reads to the shared empty table, so
    /// its subtree enumerates to zero properties; writes through it fail
    /// recoverably.
    pub fn owned<T, R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        T: Describe,
        R: Fn(&I) -> Option<&T> + Send + Sync + 'static,
        M: Fn(&mut I) -> Option<&mut T> + Send + Sync + 'static,
    {
        let descend = descend_fn(move |inst: &dyn Any, _index| {
            let i = inst.downcast_ref::<I>()?;
            Some(match get(i) {
                Some(t) => (T::table(), t as &dyn Any),
                None => (empty_table(), empty_instance()),
            })
        });
        let descend_mut = descend_mut_fn(move |inst: &mut dyn Any, _index| {
            let i = inst.downcast_mut::<I>()?;
            let t = set(i)?;
            Some((T::table(), t as &mut dyn Any))
        });
        Self::raw(
            name.into(),
            Dispatch::Nested(NestedAccess {
                descend,
                descend_mut,
            }),
            None,
        )
    }

    /// Like `owned`, but through the virtual binding: the table comes from
    /// the instance, so one field can hold any `Reflect` implementor.
    pub fn owned_dyn<R, M>(name: impl Into<String>, get: R, set: M) -> Self
    where
        R: Fn(&I) -> Option<&dyn Reflect> + Send + Sync + 'static,
        M: Fn(&mut I) -> Option<&mut dyn Reflect> + Send + Sync + 'static,
    {
        let descend = descend_fn(move |inst: &dyn Any, _index| {
            let i = inst.downcast_ref::<I>()?;
            Some(match get(i) {
                Some(t) => {
                    let table = t.property_table();
                    let any: &dyn Any = t;
                    (table, any)
                }
                None => (empty_table(), empty_instance()),
            })
        });
        let descend_mut = descend_mut_fn(move |inst: &mut dyn Any, _index| {
            let i = inst.downcast_mut::<I>()?;
            let t = set(i)?;
            let table = t.property_table();
            let any: &mut dyn Any = t;
            Some((table, any))
        });
        Self::raw(
            name.into(),
            Dispatch::Nested(NestedAccess {
                descend,
                descend_mut,
            }),
            None,
        )
    }

    /// A parent link: the parent type's whole table becomes a sub-scope
    /// named after the parent table. Declare one per parent.
    pub fn parent<P, R, M>(get: R, set: M) -> Self
    where
        P: Describe,
        R: Fn(&I) -> &P + Send + Sync + 'static,
        M: Fn(&mut I) -> &mut P + Send + Sync + 'static,
    {
        match P::table().name() {
            Some(parent_name) => Self::nested(parent_name.to_string(), get, set),
            None => {
                let mut field = Self::raw(String::new(), Self::dead_nested(), None);
                field.error = Some(TableError::InvalidName {
                    name: String::new(),
                    message: "parent tables must be named".to_string(),
                });
                field
            }
        }
    }

    /// A named scope grouping fields of the same instance. The scope's
    /// sub-table is built inline and lives for the process lifetime.
    pub fn scope(
        name: impl Into<String>,
        build: impl FnOnce(TableBuilder<I>) -> TableBuilder<I>,
    ) -> Self {
        let name = name.into();
        match build(TableBuilder::<I>::named(name.clone())).build() {
            Ok(table) => {
                let table: &'static Table = Box::leak(Box::new(table));
                let descend = descend_fn(move |inst: &dyn Any, _index| Some((table, inst)));
                let descend_mut =
                    descend_mut_fn(move |inst: &mut dyn Any, _index| Some((table, inst)));
                Self::raw(
                    name,
                    Dispatch::Nested(NestedAccess {
                        descend,
                        descend_mut,
                    }),
                    None,
                )
            }
            Err(error) => {
                let mut field = Self::raw(name, Self::dead_nested(), None);
                field.error = Some(error);
                field
            }
        }
    }

    // === Modifiers ===

    /// Override the display name (and therefore the hash key).
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach help text.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Set static flags. Mutually exclusive with `dynamic_flags`.
    pub fn flags(mut self, flags: Flags) -> Self {
        debug_assert!(
            self.dynamic.is_none(),
            "a property carries static or dynamic flags, not both"
        );
        self.flags = flags;
        self
    }

    /// Compute flags per instance. Mutually exclusive with `flags`.
    pub fn dynamic_flags<F>(mut self, f: F) -> Self
    where
        F: Fn(&I) -> Flags + Send + Sync + 'static,
    {
        debug_assert!(
            self.flags.is_empty(),
            "a property carries static or dynamic flags, not both"
        );
        self.dynamic = Some(Box::new(move |inst: &dyn Any| {
            inst.downcast_ref::<I>().map_or(Flags::empty(), |i| f(i))
        }));
        self
    }

    /// Attach one editor metadata pair.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

fn validate_name(name: &str) -> Result<(), TableError> {
    let invalid = |message: &str| TableError::InvalidName {
        name: name.to_string(),
        message: message.to_string(),
    };
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("empty name"));
    };
    if name == "_" {
        return Err(invalid("a lone underscore is not a name"));
    }
    if !(unicode_ident::is_xid_start(first) || first == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    for c in chars {
        if !unicode_ident::is_xid_continue(c) {
            return Err(invalid("contains a character not valid in an identifier"));
        }
    }
    Ok(())
}
