//! # Schemata Database
//!
//! Forward-only schema migrations for relational databases.
//!
//! This crate combines two layers:
//!
//! - **backends**: a thin async connection abstraction over sqlx drivers
//!   (SQLite, PostgreSQL, MySQL) used to execute rendered statements
//! - **migrations**: the migration engine itself, made of a backend-independent
//!   schema model, per-backend SQL dialects, migration steps, the composite
//!   "table replace" builder, the migration log and the migrator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schemata_db::backends::DatabaseConnection;
//! use schemata_db::migrations::{ColumnType, MigrationStep, Migrator, SchemaColumn, SchemaTable};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = DatabaseConnection::connect("sqlite::memory:").await?;
//! let mut migrator = Migrator::new(connection);
//!
//! let users = SchemaTable::new("users")
//!     .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
//!     .column(SchemaColumn::new("name", ColumnType::NVarchar(255)));
//!
//! migrator.register("create users table", MigrationStep::create_table(users))?;
//! let report = migrator.start().await?;
//! assert_eq!(report.applied.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! Steps run strictly in registration order. Every attempt is recorded in the
//! `migration_log` table, and identifiers with a successful entry are skipped on
//! later runs, so a run that failed part way resumes at the failed step.

pub mod backends;
pub mod migrations;

pub use backends::{DatabaseConnection, DatabaseError, DatabaseType};
pub use migrations::{MigrationError, MigrationStep, Migrator};
