//! # Schemata
//!
//! Forward-only, resumable database schema migrations for SQLite, PostgreSQL and
//! MySQL.
//!
//! Migrations are identified steps registered in a fixed order. Each run applies
//! the steps that have no successful entry in the `migration_log` table yet, so a
//! run that failed part way resumes at the failed step once the cause is fixed.
//! Structural changes SQLite cannot express in place go through a table replace:
//! rename the old table, create the new one, copy the rows across, drop the old.
//!
//! ## Crates
//!
//! - [`db`] (`schemata-db`): connections, SQL dialects and the migrator
//! - [`conf`] (`schemata-conf`): `[database]` settings and connection strings
//! - [`store`]: opens the configured database and runs all registered migrations
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - SQLite driver
//! - `postgres` (default) - PostgreSQL driver
//! - `mysql` (default) - MySQL driver
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use schemata::prelude::*;
//!
//! fn add_user_migrations(migrator: &mut Migrator) -> schemata::db::migrations::Result<()> {
//!     let users = SchemaTable::new("users")
//!         .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
//!         .column(SchemaColumn::new("login", ColumnType::NVarchar(190)))
//!         .index(SchemaIndex::unique(["login"]));
//!     migrator.register("create users table", MigrationStep::create_table(users.clone()))?;
//!     migrator.register(
//!         "create index UQE_users_login - v1",
//!         MigrationStep::create_index("users", users.indices[0].clone()),
//!     )?;
//!     Ok(())
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_file("schemata.toml")?;
//! let store = SqlStore::init(&settings, &[add_user_migrations]).await?;
//! println!("applied {} migrations", store.report().applied.len());
//! # Ok(())
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
//! ```

pub mod conf;
pub mod db;
pub mod store;

pub use schemata_conf::{ConfigError, DatabaseConfig, Settings};
pub use schemata_db::backends::{DatabaseConnection, DatabaseError, DatabaseType};
pub use schemata_db::migrations::{
	MigrationError, MigrationReport, MigrationStep, Migrator, MigratorState, SqlDialect,
};
pub use store::{Registrar, SqlStore, StoreError};

/// Everything needed to declare migrations and run them through [`SqlStore`]
pub mod prelude {
	pub use crate::store::{Registrar, SqlStore, StoreError};
	pub use schemata_conf::Settings;
	pub use schemata_db::backends::DatabaseConnection;
	pub use schemata_db::migrations::prelude::*;
}
