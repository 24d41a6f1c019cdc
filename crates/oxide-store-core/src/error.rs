//! Error types for store operations.
//!
//! Display strings are part of the wire contract: the REST layer forwards
//! them verbatim, so changing one is a breaking change.

use crate::types::ColumnType;

/// Errors that can occur while executing commands against the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A table with this name already exists.
    #[error("table {0} already exists")]
    TableAlreadyExists(String),

    /// No table with this name.
    #[error("table {0} not found")]
    TableNotFound(String),

    /// An inserted row is missing schema columns.
    #[error("{} required", list_columns(.0))]
    ColumnsRequired(Vec<String>),

    /// A row or predicate names columns absent from the schema.
    #[error("{} not found", list_columns(.0))]
    ColumnsNotFound(Vec<String>),

    /// A create-table command arrived with an empty column map.
    #[error("cannot create table without columns")]
    NoColumns,

    /// A schema entry used a type tag outside the supported set.
    #[error("cannot create column {column} with type {type_name}")]
    InvalidTypeProvided {
        /// Column the bad tag was declared for.
        column: String,
        /// The unsupported type tag.
        type_name: String,
    },

    /// A real interval with a lower bound above its upper bound.
    #[error("invalid range {a}>{b}")]
    InvalidRange {
        /// Lower bound.
        a: f64,
        /// Upper bound.
        b: f64,
    },

    /// A real interval that is not a two element array.
    #[error("invalid range declaration, should be provided as a two element array")]
    InvalidRangeDeclaration,

    /// A value that cannot be coerced to its column's type.
    #[error("cannot convert value to {expected} for column {column}")]
    TypeMismatch {
        /// Column the value was supplied for.
        column: String,
        /// The column's declared type.
        expected: ColumnType,
    },

    /// A command with a type tag outside the supported set.
    #[error("unknown command type: {0}")]
    UnknownCommand(String),

    /// Snapshot file I/O or encoding failure.
    #[error("db io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error is an internal failure rather than a domain error.
    ///
    /// The REST layer maps internal failures to 500 and everything else
    /// to 409.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Renders a pluralised column list: `column a` or `columns a, b`.
fn list_columns(columns: &[String]) -> String {
    let noun = if columns.len() == 1 {
        "column"
    } else {
        "columns"
    };
    format!("{noun} {}", columns.join(", "))
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_messages() {
        assert_eq!(
            StoreError::TableAlreadyExists("frog".into()).to_string(),
            "table frog already exists"
        );
        assert_eq!(
            StoreError::TableNotFound("frog".into()).to_string(),
            "table frog not found"
        );
        assert_eq!(
            StoreError::NoColumns.to_string(),
            "cannot create table without columns"
        );
        assert_eq!(
            StoreError::InvalidTypeProvided {
                column: "x".into(),
                type_name: "unknown_type".into(),
            }
            .to_string(),
            "cannot create column x with type unknown_type"
        );
        assert_eq!(
            StoreError::InvalidRange { a: 3.5, b: 1.5 }.to_string(),
            "invalid range 3.5>1.5"
        );
        assert_eq!(
            StoreError::UnknownCommand("truncate".into()).to_string(),
            "unknown command type: truncate"
        );
    }

    #[test]
    fn column_lists_pluralise() {
        assert_eq!(
            StoreError::ColumnsRequired(vec!["legs".into()]).to_string(),
            "column legs required"
        );
        assert_eq!(
            StoreError::ColumnsRequired(vec!["legs".into(), "jump".into()]).to_string(),
            "columns legs, jump required"
        );
        assert_eq!(
            StoreError::ColumnsNotFound(vec!["wings".into()]).to_string(),
            "column wings not found"
        );
    }

    #[test]
    fn io_is_internal() {
        let err = StoreError::Io(std::io::Error::other("boom"));
        assert!(err.is_internal());
        assert!(!StoreError::NoColumns.is_internal());
    }
}
