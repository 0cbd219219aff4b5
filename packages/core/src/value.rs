//! The Value type - the closed scalar set of the property system.
//!
//! Every property that is not a nested object carries exactly one of these
//! variants. The set is declared once, here, and matched exhaustively by the
//! dispatch layer: adding a variant means adding a `TypeTag`, a `Scalar`
//! impl, and one arm to each dispatch match - the compiler points at all of
//! them.

use serde::{Deserialize, Serialize};

/// A scalar property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 32-bit integer. Also the type of list count pseudo-properties.
    Int(i32),
    /// 32-bit floating point.
    Float(f32),
    /// UTF-8 string.
    Str(String),
}

/// The discriminant of `Value`, used to check a write against the type a
/// dispatcher was declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
}

impl Value {
    /// The tag of this value's variant.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "string",
        };
        write!(f, "{}", name)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for bool {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for String {}
}

/// A Rust type belonging to the closed scalar set.
///
/// Sealed: the supported set is a system-wide configuration, not an open
/// extension point.
pub trait Scalar: sealed::Sealed + Clone + Send + Sync + 'static {
    /// The tag of the `Value` variant this type maps to.
    const TAG: TypeTag;

    /// Wrap into a `Value`.
    fn into_value(self) -> Value;

    /// Extract from a `Value` of the matching variant.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Scalar for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl Scalar for i32 {
    const TAG: TypeTag = TypeTag::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const TAG: TypeTag = TypeTag::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Scalar for String {
    const TAG: TypeTag = TypeTag::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

// Conversion from the underlying types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_variant() {
        assert_eq!(Value::Bool(true).tag(), TypeTag::Bool);
        assert_eq!(Value::Int(7).tag(), TypeTag::Int);
        assert_eq!(Value::Float(1.5).tag(), TypeTag::Float);
        assert_eq!(Value::from("hi").tag(), TypeTag::Str);
    }

    #[test]
    fn scalar_round_trip() {
        assert_eq!(bool::from_value(&true.into_value()), Some(true));
        assert_eq!(i32::from_value(&10.into_value()), Some(10));
        assert_eq!(f32::from_value(&10.10f32.into_value()), Some(10.10));
        assert_eq!(
            String::from_value(&"Hello".to_string().into_value()),
            Some("Hello".to_string())
        );
    }

    #[test]
    fn scalar_rejects_wrong_variant() {
        assert_eq!(bool::from_value(&Value::Int(1)), None);
        assert_eq!(i32::from_value(&Value::Bool(true)), None);
        assert_eq!(f32::from_value(&Value::Int(1)), None);
        assert_eq!(String::from_value(&Value::Float(1.0)), None);
    }

    #[test]
    fn const_tags_line_up() {
        assert_eq!(bool::TAG, TypeTag::Bool);
        assert_eq!(i32::TAG, TypeTag::Int);
        assert_eq!(f32::TAG, TypeTag::Float);
        assert_eq!(String::TAG, TypeTag::Str);
    }

    #[test]
    fn serde_json_round_trip() {
        let values = vec![
            Value::Bool(true),
            Value::Int(10),
            Value::Float(10.10),
            Value::from("Hello"),
        ];
        for v in values {
            let json = serde_json::to_string(&v).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(back, v);
        }
    }
}
