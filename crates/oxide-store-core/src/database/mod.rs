//! The database: a named collection of tables, command dispatch and
//! snapshot orchestration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;

use crate::command::{Command, CommandOutput};
use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::snapshot;
use crate::table::Table;

/// An in-process database.
///
/// Owns the table map and the snapshot path. Constructed behind an [`Arc`];
/// a background ticker holds a [`Weak`] reference and stops on its own once
/// the database is dropped.
#[derive(Debug)]
pub struct Database {
    tables: RwLock<BTreeMap<String, Arc<Table>>>,
    snapshot_path: PathBuf,
}

impl Database {
    /// Creates an empty database and spawns its snapshot ticker.
    ///
    /// The snapshot file is written immediately (an empty database
    /// serialises as `[]`), so the path is validated up front and the file
    /// is valid JSON from construction onward. Requires a running tokio
    /// runtime. A periodic dump failure is logged and does not stop the
    /// ticker; a dump slower than `dump_interval` delays the next tick.
    pub fn new(path: impl Into<PathBuf>, dump_interval: Duration) -> Result<Arc<Self>> {
        let db = Arc::new(Self {
            tables: RwLock::new(BTreeMap::new()),
            snapshot_path: path.into(),
        });
        db.store_dump()?;
        spawn_ticker(Arc::downgrade(&db), dump_interval);
        Ok(db)
    }

    /// The snapshot file path.
    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Executes one command and returns its result.
    ///
    /// Every command is a transaction over a single table: on error the
    /// target table and the table map are unchanged.
    pub fn execute(&self, command: Command) -> Result<CommandOutput> {
        match command {
            Command::CreateTable { name, schema } => {
                if schema.is_empty() {
                    return Err(StoreError::NoColumns);
                }
                self.create_table(&name, Schema::new(&schema)?)?;
                Ok(CommandOutput::Message(format!(
                    "successfully created table {name}"
                )))
            }
            Command::DropTable { name } => {
                self.drop_table(&name)?;
                Ok(CommandOutput::Message(format!(
                    "successfully dropped table {name}"
                )))
            }
            Command::Insert { to, data } => {
                let count = self.table(&to)?.insert(&data)?;
                Ok(CommandOutput::Message(format!(
                    "successfully inserted {count} {} to table {to}",
                    rows_word(count)
                )))
            }
            Command::Select {
                from,
                fields,
                conditions,
            } => Ok(CommandOutput::Rows(
                self.table(&from)?.select(&fields, &conditions)?,
            )),
            Command::Update {
                table,
                conditions,
                data,
            } => {
                let count = self.table(&table)?.update(&conditions, &data)?;
                Ok(CommandOutput::Message(format!(
                    "successfully updated {count} {} in table {table}",
                    rows_word(count)
                )))
            }
            Command::Delete { from, conditions } => {
                let count = self.table(&from)?.delete(&conditions)?;
                Ok(CommandOutput::Message(format!(
                    "successfully deleted {count} {} from table {from}",
                    rows_word(count)
                )))
            }
            Command::RemoveDuplicates { from } => {
                let count = self.table(&from)?.remove_duplicates();
                Ok(CommandOutput::Message(format!(
                    "successfully deleted {count} {} from table {from}",
                    rows_word(count)
                )))
            }
        }
    }

    /// Adds a table under a new name.
    ///
    /// Unlike the create-table command, this accepts empty schemas; the
    /// snapshot loader goes through here.
    pub fn create_table(&self, name: &str, schema: Schema) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(StoreError::TableAlreadyExists(name.to_string()));
        }
        tables.insert(name.to_string(), Arc::new(Table::new(schema)));
        Ok(())
    }

    /// Removes a table.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    /// Resolves a table by name.
    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    /// Every table's schema, by value.
    #[must_use]
    pub fn introspect_schema(&self) -> BTreeMap<String, Schema> {
        self.tables
            .read()
            .iter()
            .map(|(name, table)| (name.clone(), table.schema().clone()))
            .collect()
    }

    /// Streams the whole database to the snapshot file.
    ///
    /// The table list is cloned first so the map lock is not held during
    /// I/O; each table is locked only while it is encoded. Tables are
    /// written in name order.
    pub fn store_dump(&self) -> Result<()> {
        let tables: Vec<(String, Arc<Table>)> = self
            .tables
            .read()
            .iter()
            .map(|(name, table)| (name.clone(), Arc::clone(table)))
            .collect();
        snapshot::write_dump(&self.snapshot_path, &tables)
    }

    /// Replaces the database contents with a snapshot file.
    ///
    /// Checkpoints the current state to this database's own snapshot file
    /// first (best effort), then recreates each dumped table, re-validating
    /// every row. A failing element aborts the load and leaves the tables
    /// restored so far in place.
    pub fn from_dump(&self, path: &Path) -> Result<()> {
        if let Err(error) = self.store_dump() {
            tracing::warn!(%error, "checkpoint before restore failed");
        }
        let dumps = snapshot::read_dump(path)?;
        self.tables.write().clear();
        for dump in dumps {
            let schema = Schema::new(&dump.schema)?;
            self.create_table(&dump.name, schema)?;
            self.table(&dump.name)?.load_dump(&dump.data)?;
        }
        Ok(())
    }
}

/// Periodic snapshot task; exits once the database is dropped.
fn spawn_ticker(db: Weak<Database>, dump_interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(dump_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; construction already dumped.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(db) = db.upgrade() else { break };
            if let Err(error) = db.store_dump() {
                tracing::error!(%error, "periodic dump failed");
            }
        }
    });
}

const fn rows_word(count: usize) -> &'static str {
    if count == 1 {
        "row"
    } else {
        "rows"
    }
}
