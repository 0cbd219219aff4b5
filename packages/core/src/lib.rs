//! Core propkit primitives.
//!
//! This is the leaf layer of the property system:
//! - `Value`: the closed set of scalar types every property table understands
//! - `TypeTag`: the discriminant of that set, used for type checking on writes
//! - `Flags`: per-property visibility/writability bits
//! - `name_hash`: the 32-bit name hash used to index property tables
//!
//! Everything above (tables, path resolution, enumeration, packs) is built
//! on these types. The scalar set is deliberately closed: dispatch code
//! matches it exhaustively, so extending it is a compile-guided edit here
//! plus one new arm per match.

mod flags;
mod hash;
mod value;

pub use flags::Flags;
pub use hash::{name_hash, HASH_SEED};
pub use value::{Scalar, TypeTag, Value};
