//! The table engine: row storage with schema enforcement on every write.
//!
//! Every mutating operation validates and coerces its whole input before
//! touching the row vector, so any failure leaves the table exactly as it
//! was. Rows keep insertion order, and that order is observable through
//! select, delete and deduplication.

use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::snapshot::TableDump;
use crate::types::DataValue;

/// A single stored row: column name to typed value.
pub type ColumnSet = BTreeMap<String, DataValue>;

/// An untyped input row or predicate map, as it arrives from JSON.
pub type RawRow = BTreeMap<String, Value>;

/// A table: an immutable schema and rows in insertion order.
///
/// The row vector sits behind a `RwLock`; writers take it exclusively,
/// readers share it. The schema never changes after construction, so it
/// lives outside the lock.
#[derive(Debug)]
pub struct Table {
    schema: Schema,
    rows: RwLock<Vec<ColumnSet>>,
}

impl Table {
    /// Creates an empty table with the given schema.
    #[must_use]
    pub const fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// The table's schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of stored rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Validates and appends rows, all-or-nothing.
    ///
    /// Every row must carry exactly the schema's columns; each value is
    /// coerced to its column type. On any failure nothing is appended.
    /// Returns the number of inserted rows.
    pub fn insert(&self, rows: &[RawRow]) -> Result<usize> {
        let mut staged = Vec::with_capacity(rows.len());
        for row in rows {
            staged.push(self.validate_row(row)?);
        }
        let count = staged.len();
        self.rows.write().extend(staged);
        Ok(count)
    }

    /// Returns deep copies of matching rows in insertion order.
    ///
    /// `conditions` are equality predicates, coerced to the schema types
    /// before the scan; an empty map matches every row. A non-empty `fields`
    /// list restricts each returned copy to those columns (absent names are
    /// skipped, not errors).
    pub fn select(&self, fields: &[String], conditions: &RawRow) -> Result<Vec<ColumnSet>> {
        let conditions = self.coerce_columns(conditions)?;
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|row| matches(row, &conditions))
            .map(|row| {
                if fields.is_empty() {
                    row.clone()
                } else {
                    fields
                        .iter()
                        .filter_map(|name| {
                            row.get(name).map(|value| (name.clone(), value.clone()))
                        })
                        .collect()
                }
            })
            .collect())
    }

    /// Overwrites the named fields of every matching row.
    ///
    /// Partial updates are allowed; untouched fields are preserved. Returns
    /// the number of matched rows.
    pub fn update(&self, conditions: &RawRow, data: &RawRow) -> Result<usize> {
        let conditions = self.coerce_columns(conditions)?;
        let data = self.coerce_columns(data)?;
        let mut rows = self.rows.write();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|row| matches(row, &conditions)) {
            for (name, value) in &data {
                row.insert(name.clone(), value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    /// Removes matching rows, preserving survivor order. Returns the count.
    pub fn delete(&self, conditions: &RawRow) -> Result<usize> {
        let conditions = self.coerce_columns(conditions)?;
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| !matches(row, &conditions));
        Ok(before - rows.len())
    }

    /// Removes rows whose canonical stringification repeats an earlier row.
    ///
    /// The first occurrence is kept. Fingerprints are the full per-column
    /// strings (hashed by the set, confirmed by string equality), so rows
    /// with distinct content never collide away. Returns the removed count.
    pub fn remove_duplicates(&self) -> usize {
        let mut seen = HashSet::new();
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| seen.insert(fingerprint(row)));
        before - rows.len()
    }

    /// Snapshot form of this table under the given name.
    #[must_use]
    pub fn dump(&self, name: &str) -> TableDump {
        let rows = self.rows.read();
        TableDump {
            name: name.to_string(),
            schema: self.schema.to_tags(),
            data: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect()
                })
                .collect(),
        }
    }

    /// Re-inserts dumped rows through the full insert validation path.
    pub fn load_dump(&self, rows: &[RawRow]) -> Result<usize> {
        self.insert(rows)
    }

    /// Coerces a full input row against the schema.
    fn validate_row(&self, row: &RawRow) -> Result<ColumnSet> {
        let missing: Vec<String> = self
            .schema
            .names()
            .filter(|name| !row.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::ColumnsRequired(missing));
        }
        let extra: Vec<String> = row
            .keys()
            .filter(|name| !self.schema.contains(name))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return Err(StoreError::ColumnsNotFound(extra));
        }
        let mut typed = ColumnSet::new();
        for (name, ty) in self.schema.iter() {
            if let Some(raw) = row.get(name) {
                typed.insert(name.to_string(), DataValue::coerce(name, ty, raw)?);
            }
        }
        Ok(typed)
    }

    /// Coerces a partial column map (predicate or update data).
    fn coerce_columns(&self, values: &RawRow) -> Result<ColumnSet> {
        let unknown: Vec<String> = values
            .keys()
            .filter(|name| !self.schema.contains(name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(StoreError::ColumnsNotFound(unknown));
        }
        let mut typed = ColumnSet::new();
        for (name, raw) in values {
            if let Some(ty) = self.schema.get(name) {
                typed.insert(name.clone(), DataValue::coerce(name, ty, raw)?);
            }
        }
        Ok(typed)
    }
}

/// Whether every conditional value equals the row's stored value.
fn matches(row: &ColumnSet, conditions: &ColumnSet) -> bool {
    conditions
        .iter()
        .all(|(name, value)| row.get(name) == Some(value))
}

/// Canonical row fingerprint: per-column strings in sorted column order.
/// The unit separator keeps adjacent values from running together.
fn fingerprint(row: &ColumnSet) -> String {
    let mut key = String::new();
    for value in row.values() {
        key.push_str(&value.to_string());
        key.push('\u{1f}');
    }
    key
}
