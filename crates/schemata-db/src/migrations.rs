//! # Schemata Migrations
//!
//! Forward-only migration engine.
//!
//! ## Building blocks
//!
//! - **Schema model** ([`SchemaTable`], [`SchemaColumn`], [`SchemaIndex`], [`ColumnType`]):
//!   backend-independent values describing the target structure
//! - **Dialects** ([`Dialect`], [`SqlDialect`]): render the schema model into
//!   SQLite, PostgreSQL or MySQL statements
//! - **Steps** ([`MigrationStep`]): one identified unit of change
//! - **Table replace** ([`replace_table`]): expands "rebuild this table under a new
//!   schema" into drop-index / rename / create / copy / drop steps
//! - **Migration log** ([`MigrationLog`]): the `migration_log` table recording every
//!   attempt
//! - **Migrator** ([`Migrator`]): ordered registry and the apply loop
//!
//! ## Migration guidelines
//!
//! 1. Never change a migration once it has been applied anywhere
//! 2. Always add new migrations to change or undo earlier ones
//! 3. Register migrations in a fixed order; that order is the execution order
//!
//! ```rust
//! use schemata_db::migrations::{ColumnMapping, ColumnType, Literal, SchemaColumn, SchemaTable, replace_table};
//!
//! let v1 = SchemaTable::new("users")
//!     .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
//!     .column(SchemaColumn::new("name", ColumnType::NVarchar(255)));
//! let v2 = v1.clone()
//!     .column(SchemaColumn::new("email", ColumnType::NVarchar(255)).default_value(Literal::text("")));
//!
//! let plan = replace_table(&v1, &v2, 2, ColumnMapping::identity(&v1, &v2)).unwrap();
//! let ids: Vec<&str> = plan.steps.iter().map(|(id, _)| id.as_str()).collect();
//! assert_eq!(
//!     ids,
//!     [
//!         "rename table users to users_tmp_qwerty - v1",
//!         "create users v2",
//!         "copy users v1 to v2",
//!         "drop users_tmp_qwerty",
//!     ]
//! );
//! ```

pub mod composite;
pub mod dialect;
pub mod log;
pub mod mapping;
pub mod migrator;
pub mod schema;
pub mod step;

pub use composite::{TEMP_TABLE_SUFFIX, TableReplacePlan, replace_table};
pub use dialect::{Dialect, MySqlDialect, PostgresDialect, SqlDialect, SqliteDialect};
pub use log::{
	MIGRATION_LOG_CREATE_ID, MIGRATION_LOG_TABLE, MigrationLog, MigrationLogEntry,
	migration_log_table,
};
pub use mapping::{ColumnMapping, ColumnSource};
pub use migrator::{MigrationReport, Migrator, MigratorState};
pub use schema::{ColumnType, Literal, SchemaColumn, SchemaIndex, SchemaTable};
pub use step::MigrationStep;

use crate::backends::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
	/// A second registration used an identifier that is already registered
	#[error("Duplicate migration id: {0}")]
	DuplicateMigrationId(String),

	#[error("Unsupported dialect: {0}")]
	UnsupportedDialect(String),

	/// The requested dialect renders for a different backend than the connection
	#[error("Dialect mismatch: {requested} requested for a {connection} connection")]
	DialectMismatch { requested: String, connection: String },

	/// The supplied connection could not be used; no step was executed
	#[error("Connection error: {0}")]
	ConnectionError(#[source] DatabaseError),

	#[error("Migration '{migration_id}' failed: {message}\nSQL: {sql}")]
	ExecutionError {
		migration_id: String,
		sql: String,
		message: String,
	},

	/// A table replace stopped after some of its sub-steps succeeded
	///
	/// The previous data now lives in `temporary_table`. Rerunning after fixing
	/// the cause resumes at `migration_id`.
	#[error(
		"Table replace '{composite}' stopped part way: migration '{migration_id}' failed: {message}\nSQL: {sql}\ncompleted: [{}], old data kept in '{temporary_table}'",
		.completed.join(", ")
	)]
	PartialCompositeFailure {
		composite: String,
		temporary_table: String,
		completed: Vec<String>,
		migration_id: String,
		sql: String,
		message: String,
	},

	#[error("Invalid schema: {0}")]
	InvalidSchema(String),

	#[error("Invalid migration: {0}")]
	InvalidMigration(String),

	#[error("Database error: {0}")]
	DatabaseError(#[from] DatabaseError),
}

impl MigrationError {
	/// Identifier of the step that failed, for execution failures
	pub fn failed_migration_id(&self) -> Option<&str> {
		match self {
			MigrationError::ExecutionError { migration_id, .. }
			| MigrationError::PartialCompositeFailure { migration_id, .. } => Some(migration_id),
			_ => None,
		}
	}

	/// Rendered SQL of the step that failed, for execution failures
	pub fn failed_sql(&self) -> Option<&str> {
		match self {
			MigrationError::ExecutionError { sql, .. }
			| MigrationError::PartialCompositeFailure { sql, .. } => Some(sql),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, MigrationError>;

pub mod prelude {
	pub use super::{
		ColumnMapping, ColumnType, Literal, MigrationStep, Migrator, SchemaColumn, SchemaIndex,
		SchemaTable, replace_table,
	};
}
