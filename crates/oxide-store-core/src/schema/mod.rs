//! Table schemas: column name to column type.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::types::ColumnType;

/// A table schema.
///
/// Columns are kept in a `BTreeMap`, sorted for deterministic iteration:
/// snapshots and duplicate fingerprints rely on a stable column order.
/// Empty schemas are permitted; the resulting table only accepts empty rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Schema {
    columns: BTreeMap<String, ColumnType>,
}

impl Schema {
    /// Builds a schema from wire-form type tags.
    ///
    /// Fails with [`StoreError::InvalidTypeProvided`] on any tag outside the
    /// supported set.
    pub fn new(columns: &BTreeMap<String, String>) -> Result<Self> {
        let mut typed = BTreeMap::new();
        for (name, tag) in columns {
            let Some(ty) = ColumnType::parse(tag) else {
                return Err(StoreError::InvalidTypeProvided {
                    column: name.clone(),
                    type_name: tag.clone(),
                });
            };
            typed.insert(name.clone(), ty);
        }
        Ok(Self { columns: typed })
    }

    /// Builds a schema from already-typed columns.
    #[must_use]
    pub const fn from_types(columns: BTreeMap<String, ColumnType>) -> Self {
        Self { columns }
    }

    /// Looks up a column's type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Whether the schema has a column with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// `(name, type)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The wire-form tag map, as written to snapshots.
    #[must_use]
    pub fn to_tags(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|(name, ty)| (name.clone(), ty.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn accepts_supported_tags() {
        let schema = Schema::new(&tags(&[
            ("leg_length", "real"),
            ("jump", "realInv"),
            ("name", "string"),
        ]))
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.get("jump"), Some(ColumnType::RealInv));
        assert!(schema.contains("name"));
        assert!(!schema.contains("wings"));
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = Schema::new(&tags(&[("x", "unknown_type")])).unwrap_err();
        assert_eq!(err.to_string(), "cannot create column x with type unknown_type");
    }

    #[test]
    fn empty_schema_is_permitted() {
        let schema = Schema::new(&BTreeMap::new()).unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn value_equality() {
        let a = Schema::new(&tags(&[("id", "integer")])).unwrap();
        let b = Schema::new(&tags(&[("id", "integer")])).unwrap();
        let c = Schema::new(&tags(&[("id", "real")])).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn tags_round_trip() {
        let input = tags(&[("id", "integer"), ("span", "realInv")]);
        let schema = Schema::new(&input).unwrap();
        assert_eq!(schema.to_tags(), input);
    }

    #[test]
    fn serializes_as_tag_map() {
        let schema = Schema::new(&tags(&[("id", "integer")])).unwrap();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            serde_json::json!({"id": "integer"})
        );
    }
}
