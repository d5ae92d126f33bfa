//! Store bootstrap
//!
//! Opens the database described by [`Settings`], registers every migration the
//! host knows about, and applies the pending ones before handing out the
//! connection. A store that fails to initialise must not be used to serve
//! requests, so both connection and migration failures are returned as errors.

use schemata_conf::{ConfigError, Settings};
use schemata_db::backends::{DatabaseConnection, DatabaseError};
use schemata_db::migrations::{MigrationError, MigrationReport, Migrator, SqlDialect};
use std::fs;

/// Registers one feature area's migrations
///
/// Registrars run in the order they are passed to [`SqlStore::init`]; that order
/// is the execution order of their steps.
pub type Registrar = fn(&mut Migrator) -> schemata_db::migrations::Result<()>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("Failed to create database directory: {0}")]
	Io(#[from] std::io::Error),

	#[error("Failed to connect to {db_type} database: {source}")]
	Connect {
		db_type: String,
		#[source]
		source: DatabaseError,
	},

	#[error("Failed to register migrations: {0}")]
	Registration(#[source] MigrationError),

	#[error("Migration failed: {0}")]
	Migration(#[source] MigrationError),
}

/// Migrated database ready for use
#[derive(Clone)]
pub struct SqlStore {
	connection: DatabaseConnection,
	dialect: SqlDialect,
	report: MigrationReport,
}

impl SqlStore {
	/// Connect and bring the schema up to date
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use schemata::conf::Settings;
	/// use schemata::store::SqlStore;
	///
	/// # async fn example() {
	/// let settings = Settings::from_toml_str("data_path = \"/tmp/app\"").unwrap();
	/// let store = SqlStore::init(&settings, &[]).await.unwrap();
	/// assert_eq!(store.dialect().as_str(), "sqlite3");
	/// # }
	/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
	/// ```
	pub async fn init(settings: &Settings, registrars: &[Registrar]) -> Result<Self, StoreError> {
		let database = &settings.database;
		let connection_string = settings.connection_string()?;

		if let Some(parent) = settings.sqlite_file().as_deref().and_then(|file| file.parent()) {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}

		tracing::info!(db_type = %database.db_type, "Connecting to DB");
		let connection = DatabaseConnection::connect_with(&connection_string, database.log_queries)
			.await
			.map_err(|source| StoreError::Connect {
				db_type: database.db_type.clone(),
				source,
			})?;

		// An explicit connection string decides the backend on its own
		let mut migrator = if database.connection_string.is_some() {
			Migrator::new(connection.clone())
		} else {
			Migrator::for_dialect(connection.clone(), &database.db_type)
				.map_err(StoreError::Registration)?
		};

		for register in registrars {
			register(&mut migrator).map_err(StoreError::Registration)?;
		}

		let report = match migrator.start().await {
			Ok(report) => report,
			Err(err) => {
				tracing::error!(error = %err, "Migration failed, refusing to continue");
				return Err(StoreError::Migration(err));
			}
		};

		Ok(Self {
			connection,
			dialect: migrator.dialect(),
			report,
		})
	}

	pub fn connection(&self) -> &DatabaseConnection {
		&self.connection
	}

	pub fn dialect(&self) -> SqlDialect {
		self.dialect
	}

	/// What the initialising run applied and skipped
	pub fn report(&self) -> &MigrationReport {
		&self.report
	}
}
