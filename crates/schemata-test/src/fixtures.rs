//! rstest fixtures
//!
//! Every fixture hands out a fresh database, so tests never share state.

use rstest::*;
use schemata_db::backends::DatabaseConnection;
use schemata_db::migrations::{ColumnType, SchemaColumn, SchemaIndex, SchemaTable};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh in-memory SQLite database on a single-connection pool
#[fixture]
pub async fn sqlite_connection() -> DatabaseConnection {
	DatabaseConnection::connect("sqlite::memory:")
		.await
		.expect("Failed to open in-memory SQLite database")
}

/// SQLite file in a temporary directory
///
/// Unlike an in-memory database it survives reconnecting, which restart and
/// resume tests need. The directory is removed on drop.
pub struct TempDatabase {
	// Held for its Drop
	_dir: TempDir,
	path: PathBuf,
}

impl TempDatabase {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory");
		let path = dir.path().join("schemata.db");
		Self { _dir: dir, path }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn url(&self) -> String {
		format!("sqlite://{}?mode=rwc", self.path.display())
	}

	/// Open a new connection, as a restarted process would
	pub async fn connect(&self) -> DatabaseConnection {
		DatabaseConnection::connect(&self.url())
			.await
			.expect("Failed to open temporary SQLite database")
	}
}

impl Default for TempDatabase {
	fn default() -> Self {
		Self::new()
	}
}

#[fixture]
pub fn temp_database() -> TempDatabase {
	TempDatabase::new()
}

/// `users { id, name }` with an index on `name`
#[fixture]
pub fn users_v1() -> SchemaTable {
	SchemaTable::new("users")
		.column(
			SchemaColumn::new("id", ColumnType::BigInt)
				.primary_key()
				.auto_increment(),
		)
		.column(SchemaColumn::new("name", ColumnType::NVarchar(255)))
		.index(SchemaIndex::new(["name"]))
}

/// `users_v1` plus `email` defaulting to the empty string, indexed as unique
/// together with `name`
#[fixture]
pub fn users_v2() -> SchemaTable {
	SchemaTable::new("users")
		.column(
			SchemaColumn::new("id", ColumnType::BigInt)
				.primary_key()
				.auto_increment(),
		)
		.column(SchemaColumn::new("name", ColumnType::NVarchar(255)))
		.column(
			SchemaColumn::new("email", ColumnType::NVarchar(255))
				.default_value(schemata_db::migrations::Literal::text("")),
		)
		.index(SchemaIndex::unique(["name", "email"]))
}
