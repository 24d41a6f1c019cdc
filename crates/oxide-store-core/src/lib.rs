//! # oxide-store-core
//!
//! A small, in-process, schema-enforced tabular store.
//!
//! This crate provides:
//! - A closed set of column types with well-defined coercion from untyped
//!   JSON inputs
//! - A table engine that enforces its schema on every write, evaluates
//!   equality predicates and serialises concurrent readers and writers
//! - A database that dispatches typed commands and periodically streams its
//!   whole state to a JSON snapshot file
//!
//! ## Quick start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::time::Duration;
//!
//! use oxide_store_core::{Command, Database};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> oxide_store_core::Result<()> {
//! # let dir = tempfile::tempdir().unwrap();
//! let db = Database::new(dir.path().join(".dump.json"), Duration::from_secs(60))?;
//!
//! let schema: BTreeMap<String, String> =
//!     [("leg_length".to_string(), "real".to_string())].into_iter().collect();
//! db.execute(Command::CreateTable { name: "frog".into(), schema })?;
//!
//! let out = db.execute(Command::Insert {
//!     to: "frog".into(),
//!     data: vec![[("leg_length".to_string(), 1.0.into())].into_iter().collect()],
//! })?;
//! assert_eq!(out.message(), Some("successfully inserted 1 row to table frog"));
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod database;
pub mod error;
pub mod schema;
pub mod snapshot;
pub mod table;
pub mod types;

pub use command::{Command, CommandOutput};
pub use database::Database;
pub use error::{Result, StoreError};
pub use schema::Schema;
pub use snapshot::TableDump;
pub use table::{ColumnSet, RawRow, Table};
pub use types::{ColumnType, DataValue};
