//! Table entries.
//!
//! Each property contributes two parallel records: an `ActionEntry` holding
//! the dispatch machinery the system runs on, and a `UserEntry` holding the
//! metadata an editor shows. They share an index; `UserEntry` duplicates the
//! name hash so reverse lookup by index never touches the hash index.

use std::any::Any;
use std::collections::BTreeMap;

use propkit_core::Flags;

use crate::access::Dispatch;
use crate::list::ListDriver;

/// Computes a property's flags from the owning instance.
pub type DynamicFlagsFn = Box<dyn for<'a> Fn(&'a dyn Any) -> Flags + Send + Sync>;

/// Where a property's effective flags come from.
pub enum FlagSource {
    /// Fixed at registration.
    Static(Flags),
    /// Computed per instance, re-evaluated on every use and never cached.
    Dynamic(DynamicFlagsFn),
}

impl FlagSource {
    /// Evaluate against an instance.
    pub fn effective(&self, instance: &dyn Any) -> Flags {
        match self {
            FlagSource::Static(flags) => *flags,
            FlagSource::Dynamic(f) => f(instance),
        }
    }

    /// Whether the flags can vary per instance.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FlagSource::Dynamic(_))
    }
}

/// The dispatch record of one property.
pub struct ActionEntry {
    pub(crate) flags: FlagSource,
    pub(crate) dispatch: Dispatch,
    pub(crate) lists: Option<ListDriver>,
}

impl ActionEntry {
    pub fn flags(&self) -> &FlagSource {
        &self.flags
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn list_driver(&self) -> Option<&ListDriver> {
        self.lists.as_ref()
    }
}

/// The user-facing record of one property.
pub struct UserEntry {
    pub(crate) name: String,
    pub(crate) name_hash: u32,
    pub(crate) help: Option<String>,
    pub(crate) meta: BTreeMap<String, String>,
}

impl UserEntry {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hash of the display name; the key this entry is indexed under.
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// Help text, if any was registered.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Open-ended editor metadata ("min", "step", "widget", ...). The core
    /// never interprets it.
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }
}
