//! Typed commands and their results.
//!
//! A command executes atomically against one table. The variant set is
//! closed; the open-world check (an arbitrary `type` tag arriving over the
//! wire) lives in [`Command::from_json`], which is how callers get the
//! `unknown command type` error instead of a serde message.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::table::{ColumnSet, RawRow};

/// A command against the database.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Create a new table.
    CreateTable {
        /// Table name.
        name: String,
        /// Column name to type tag.
        #[serde(default)]
        schema: BTreeMap<String, String>,
    },
    /// Drop an existing table.
    DropTable {
        /// Table name.
        name: String,
    },
    /// Insert rows into a table.
    Insert {
        /// Target table.
        to: String,
        /// Rows to insert.
        #[serde(default)]
        data: Vec<RawRow>,
    },
    /// Select rows from a table.
    Select {
        /// Source table.
        from: String,
        /// Columns to project; empty selects all.
        #[serde(default)]
        fields: Vec<String>,
        /// Equality predicates; empty matches all.
        #[serde(default)]
        conditions: RawRow,
    },
    /// Update matching rows in a table.
    Update {
        /// Target table.
        table: String,
        /// Equality predicates.
        #[serde(default)]
        conditions: RawRow,
        /// Fields to overwrite.
        data: RawRow,
    },
    /// Delete matching rows from a table.
    Delete {
        /// Target table.
        from: String,
        /// Equality predicates.
        #[serde(default)]
        conditions: RawRow,
    },
    /// Remove duplicate rows from a table.
    RemoveDuplicates {
        /// Target table.
        from: String,
    },
}

/// Wire tags of the supported command variants.
const COMMAND_TYPES: [&str; 7] = [
    "create_table",
    "drop_table",
    "insert",
    "select",
    "update",
    "delete",
    "remove_duplicates",
];

impl Command {
    /// Parses a tagged JSON command.
    ///
    /// A missing or unsupported `type` tag fails with
    /// [`StoreError::UnknownCommand`]; a supported tag with a malformed
    /// payload surfaces as an internal error.
    pub fn from_json(value: Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !COMMAND_TYPES.contains(&tag.as_str()) {
            return Err(StoreError::UnknownCommand(tag));
        }
        serde_json::from_value(value).map_err(|e| StoreError::Io(e.into()))
    }
}

/// The successful result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// A human-readable confirmation, serialized as `{"message": ...}`.
    Message(String),
    /// Row copies from a select, serialized as a JSON array.
    Rows(Vec<ColumnSet>),
}

impl CommandOutput {
    /// The confirmation message, if this is a message result.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(m) => Some(m),
            Self::Rows(_) => None,
        }
    }

    /// The selected rows, if this is a rows result.
    #[must_use]
    pub fn rows(&self) -> Option<&[ColumnSet]> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Message(_) => None,
        }
    }
}

impl Serialize for CommandOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Message(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            Self::Rows(rows) => rows.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataValue;
    use serde_json::json;

    #[test]
    fn parses_tagged_commands() {
        let cmd = Command::from_json(json!({
            "type": "create_table",
            "name": "frog",
            "schema": {"leg_length": "real"},
        }))
        .unwrap();
        assert!(matches!(cmd, Command::CreateTable { name, .. } if name == "frog"));

        let cmd = Command::from_json(json!({"type": "select", "from": "frog"})).unwrap();
        match cmd {
            Command::Select {
                from,
                fields,
                conditions,
            } => {
                assert_eq!(from, "frog");
                assert!(fields.is_empty());
                assert!(conditions.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Command::from_json(json!({"type": "truncate", "from": "frog"})).unwrap_err();
        assert_eq!(err.to_string(), "unknown command type: truncate");

        let err = Command::from_json(json!({"from": "frog"})).unwrap_err();
        assert!(matches!(err, StoreError::UnknownCommand(tag) if tag.is_empty()));
    }

    #[test]
    fn output_serialization() {
        let message = CommandOutput::Message("done".into());
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"message": "done"})
        );

        let rows = CommandOutput::Rows(vec![[("id".to_string(), DataValue::Integer(1))]
            .into_iter()
            .collect()]);
        assert_eq!(serde_json::to_value(&rows).unwrap(), json!([{"id": 1}]));
    }
}
