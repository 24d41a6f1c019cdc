//! Snapshot codec: streaming JSON encode/decode of the whole database.
//!
//! The snapshot file is a single JSON array of per-table dumps. The writer
//! streams one table element at a time, so memory cost stays at one table
//! regardless of database size. Writes truncate the file; a shorter snapshot
//! never leaves stale trailing bytes from a longer predecessor.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::{RawRow, Table};

/// The snapshot form of one table.
///
/// `schema` maps column names to wire-form type tags; `data` holds rows as
/// plain JSON objects. Loading re-validates every row, so a dump produced by
/// a table always round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDump {
    /// Table name.
    pub name: String,
    /// Column name to type tag.
    pub schema: BTreeMap<String, String>,
    /// Rows in insertion order.
    pub data: Vec<RawRow>,
}

/// Streams a snapshot of the given tables to `path`.
///
/// Each table's lock is taken only while that table is encoded; the snapshot
/// is a sequence of per-table snapshots, not a cross-table point in time.
pub fn write_dump(path: &Path, tables: &[(String, Arc<Table>)]) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut serializer = serde_json::Serializer::new(BufWriter::new(file));
    let mut seq = serializer
        .serialize_seq(Some(tables.len()))
        .map_err(io::Error::from)?;
    for (name, table) in tables {
        seq.serialize_element(&table.dump(name))
            .map_err(io::Error::from)?;
    }
    seq.end().map_err(io::Error::from)?;
    serializer.into_inner().flush()?;
    Ok(())
}

/// Reads and parses a whole snapshot file.
pub fn read_dump(path: &Path) -> Result<Vec<TableDump>> {
    let file = File::open(path)?;
    let dumps = serde_json::from_reader(BufReader::new(file)).map_err(io::Error::from)?;
    Ok(dumps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn sample_table() -> Arc<Table> {
        let schema = Schema::new(
            &[("id".to_string(), "integer".to_string())]
                .into_iter()
                .collect(),
        )
        .unwrap();
        let table = Arc::new(Table::new(schema));
        table
            .insert(&[
                [("id".to_string(), json!(1))].into_iter().collect(),
                [("id".to_string(), json!(2))].into_iter().collect(),
            ])
            .unwrap();
        table
    }

    #[test]
    fn writes_a_single_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        write_dump(&path, &[("ids".to_string(), sample_table())]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            json!([{"name": "ids", "schema": {"id": "integer"}, "data": [{"id": 1}, {"id": 2}]}])
        );
    }

    #[test]
    fn empty_database_serialises_as_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        write_dump(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn shorter_snapshot_truncates_longer_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        write_dump(&path, &[("ids".to_string(), sample_table())]).unwrap();
        write_dump(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn read_round_trips_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        write_dump(&path, &[("ids".to_string(), sample_table())]).unwrap();

        let dumps = read_dump(&path).unwrap();
        assert_eq!(dumps.len(), 1);
        assert_eq!(dumps[0].name, "ids");
        assert_eq!(dumps[0].data.len(), 2);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dump(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_internal());
    }
}
