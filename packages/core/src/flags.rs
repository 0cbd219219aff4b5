//! Per-property visibility and writability flags.

use bitflags::bitflags;

bitflags! {
    /// Effective flags of a property.
    ///
    /// A property carries either a static set of these or a callback that
    /// computes them from the instance on every evaluation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// The property may not be edited. It still saves and loads.
        const READ_ONLY = 1 << 0;
        /// The property is skipped by serialize enumeration and pack encode.
        const DONT_SAVE = 1 << 1;
        /// The property is skipped by display enumeration.
        const DONT_SHOW = 1 << 2;
        /// Set by the enumerator on synthetic scope records. Never declared
        /// on a property directly.
        const SCOPE = 1 << 3;
        /// Completely disables a property: neither saved nor shown.
        const DISABLE = Self::DONT_SAVE.bits() | Self::DONT_SHOW.bits();
    }
}
