//! The dispatch layer: typed get/set accessors and nested descent.
//!
//! `Dispatch` is a closed tagged union with one variant per supported scalar
//! type plus one `Nested` variant. Scalar variants hold a read/write closure
//! pair; nested variants hold a descend pair that resolves a
//! `(sub-table, sub-instance)` out of the owning instance. The pairs exist
//! because Rust splits shared and mutable borrows where the same dispatcher
//! would take a read/write flag in a pointer-based design.
//!
//! The `index` argument is a list element index, or `LIST_END` for
//! non-list properties.

use std::any::Any;

use propkit_core::{Scalar, TypeTag, Value};

use crate::table::Table;

/// Reads one scalar out of an instance. `None` on downcast failure or an
/// out-of-range list index.
pub type ReadFn<T> = Box<dyn for<'a> Fn(&'a dyn Any, u64) -> Option<T> + Send + Sync>;

/// Writes one scalar into an instance. `false` on downcast failure, an
/// out-of-range list index, or a setter that rejected the value.
pub type WriteFn<T> = Box<dyn for<'a> Fn(&'a mut dyn Any, u64, &T) -> bool + Send + Sync>;

/// Resolves a nested `(table, instance)` pair for reading.
pub type DescendFn =
    Box<dyn for<'a> Fn(&'a dyn Any, u64) -> Option<(&'static Table, &'a dyn Any)> + Send + Sync>;

/// Resolves a nested `(table, instance)` pair for writing.
pub type DescendMutFn = Box<
    dyn for<'a> Fn(&'a mut dyn Any, u64) -> Option<(&'static Table, &'a mut dyn Any)>
        + Send
        + Sync,
>;

/// Accessor pair for one scalar property.
pub struct ScalarAccess<T> {
    pub read: ReadFn<T>,
    pub write: WriteFn<T>,
}

/// Accessor pair for one nested property (embedded object, owned pointer,
/// parent link, or scope).
pub struct NestedAccess {
    pub descend: DescendFn,
    pub descend_mut: DescendMutFn,
}

/// The tagged get/set dispatcher of one entry.
pub enum Dispatch {
    Bool(ScalarAccess<bool>),
    Int(ScalarAccess<i32>),
    Float(ScalarAccess<f32>),
    Str(ScalarAccess<String>),
    Nested(NestedAccess),
}

impl Dispatch {
    /// The scalar type this dispatcher was declared with, `None` for nested.
    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            Dispatch::Bool(_) => Some(TypeTag::Bool),
            Dispatch::Int(_) => Some(TypeTag::Int),
            Dispatch::Float(_) => Some(TypeTag::Float),
            Dispatch::Str(_) => Some(TypeTag::Str),
            Dispatch::Nested(_) => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Dispatch::Nested(_))
    }

    /// The nested accessor, if this dispatcher is nested.
    pub fn nested(&self) -> Option<&NestedAccess> {
        match self {
            Dispatch::Nested(n) => Some(n),
            _ => None,
        }
    }

    /// Read this property as a `Value`. `None` for nested dispatchers and
    /// failed reads.
    pub fn read_value(&self, instance: &dyn Any, index: u64) -> Option<Value> {
        match self {
            Dispatch::Bool(a) => (a.read)(instance, index).map(Scalar::into_value),
            Dispatch::Int(a) => (a.read)(instance, index).map(Scalar::into_value),
            Dispatch::Float(a) => (a.read)(instance, index).map(Scalar::into_value),
            Dispatch::Str(a) => (a.read)(instance, index).map(Scalar::into_value),
            Dispatch::Nested(_) => None,
        }
    }

    /// Write a `Value` into this property. Fails when the value's tag does
    /// not match the declared type, and always fails for nested dispatchers.
    pub fn write_value(&self, instance: &mut dyn Any, index: u64, value: &Value) -> bool {
        match self {
            Dispatch::Bool(a) => match value {
                Value::Bool(v) => (a.write)(instance, index, v),
                _ => false,
            },
            Dispatch::Int(a) => match value {
                Value::Int(v) => (a.write)(instance, index, v),
                _ => false,
            },
            Dispatch::Float(a) => match value {
                Value::Float(v) => (a.write)(instance, index, v),
                _ => false,
            },
            Dispatch::Str(a) => match value {
                Value::Str(v) => (a.write)(instance, index, v),
                _ => false,
            },
            Dispatch::Nested(_) => false,
        }
    }
}

/// Maps a `Scalar` type to its `Dispatch` variant. Implemented exactly for
/// the closed scalar set.
pub trait DispatchScalar: Scalar {
    fn dispatch(access: ScalarAccess<Self>) -> Dispatch;
}

impl DispatchScalar for bool {
    fn dispatch(access: ScalarAccess<Self>) -> Dispatch {
        Dispatch::Bool(access)
    }
}

impl DispatchScalar for i32 {
    fn dispatch(access: ScalarAccess<Self>) -> Dispatch {
        Dispatch::Int(access)
    }
}

impl DispatchScalar for f32 {
    fn dispatch(access: ScalarAccess<Self>) -> Dispatch {
        Dispatch::Float(access)
    }
}

impl DispatchScalar for String {
    fn dispatch(access: ScalarAccess<Self>) -> Dispatch {
        Dispatch::Str(access)
    }
}

// Boxing helpers. Passing a closure through these pins down the
// higher-ranked lifetimes rustc cannot infer through a bare `Box::new`.

pub(crate) fn read_fn<T, F>(f: F) -> ReadFn<T>
where
    F: for<'a> Fn(&'a dyn Any, u64) -> Option<T> + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) fn write_fn<T, F>(f: F) -> WriteFn<T>
where
    F: for<'a> Fn(&'a mut dyn Any, u64, &T) -> bool + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) fn descend_fn<F>(f: F) -> DescendFn
where
    F: for<'a> Fn(&'a dyn Any, u64) -> Option<(&'static Table, &'a dyn Any)>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

pub(crate) fn descend_mut_fn<F>(f: F) -> DescendMutFn
where
    F: for<'a> Fn(&'a mut dyn Any, u64) -> Option<(&'static Table, &'a mut dyn Any)>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::LIST_END;

    struct Probe {
        value: i32,
    }

    fn probe_dispatch() -> Dispatch {
        let read = read_fn(|inst: &dyn Any, _index| {
            inst.downcast_ref::<Probe>().map(|p| p.value)
        });
        let write = write_fn(|inst: &mut dyn Any, _index, v: &i32| {
            match inst.downcast_mut::<Probe>() {
                Some(p) => {
                    p.value = *v;
                    true
                }
                None => false,
            }
        });
        i32::dispatch(ScalarAccess { read, write })
    }

    #[test]
    fn scalar_read_write() {
        let dispatch = probe_dispatch();
        let mut probe = Probe { value: 3 };

        assert_eq!(
            dispatch.read_value(&probe, LIST_END),
            Some(Value::Int(3))
        );
        assert!(dispatch.write_value(&mut probe, LIST_END, &Value::Int(42)));
        assert_eq!(probe.value, 42);
    }

    #[test]
    fn write_rejects_mismatched_tag() {
        let dispatch = probe_dispatch();
        let mut probe = Probe { value: 3 };

        assert!(!dispatch.write_value(&mut probe, LIST_END, &Value::Bool(true)));
        assert_eq!(probe.value, 3);
    }

    #[test]
    fn read_fails_on_foreign_instance() {
        let dispatch = probe_dispatch();
        let other = 17u8;
        assert_eq!(dispatch.read_value(&other, LIST_END), None);
    }

    #[test]
    fn tags() {
        assert_eq!(probe_dispatch().tag(), Some(TypeTag::Int));
        assert!(!probe_dispatch().is_nested());
    }
}
