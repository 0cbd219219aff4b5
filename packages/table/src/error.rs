//! Construction-time errors.
//!
//! Everything here is fatal at registration: a table that fails to build has
//! a schema bug, not a bad input. Runtime failures (unknown path, type
//! mismatch, read-only write) are `Option`/`bool` results on the operations
//! themselves and never appear in this enum.

use thiserror::Error;

/// Errors raised while building a property table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two properties in one table hash to the same key. Rename one of them.
    #[error("duplicate property name '{name}' (hash {hash:#010x}) in table '{table}'")]
    DuplicateName {
        table: String,
        name: String,
        hash: u32,
    },

    /// A property or table name is not a valid identifier.
    #[error("invalid name '{name}': {message}")]
    InvalidName { name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = TableError::DuplicateName {
            table: "Motor".to_string(),
            name: "Rpm".to_string(),
            hash: 0xdead_beef,
        };
        let text = e.to_string();
        assert!(text.contains("Motor"));
        assert!(text.contains("Rpm"));
        assert!(text.contains("0xdeadbeef"));
    }

    #[test]
    fn invalid_name_display() {
        let e = TableError::InvalidName {
            name: "bad name".to_string(),
            message: "whitespace is not allowed".to_string(),
        };
        let text = e.to_string();
        assert!(text.contains("bad name"));
        assert!(text.contains("whitespace"));
    }
}
