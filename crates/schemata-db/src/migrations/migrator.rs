//! Migrator
//!
//! Holds the ordered registry of steps and applies the pending ones against a
//! single connection.

use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashSet;

use super::composite::TableReplacePlan;
use super::dialect::{Dialect, SqlDialect};
use super::log::{MIGRATION_LOG_CREATE_ID, MigrationLog, migration_log_table};
use super::schema::SchemaTable;
use super::step::MigrationStep;
use super::{MigrationError, Result};
use crate::backends::DatabaseConnection;

/// Lifecycle of a migrator
///
/// `Uninitialized -> LogReady -> Running -> Completed | Failed`. A finished
/// migrator can be started again; it then skips everything already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigratorState {
	Uninitialized,
	/// The applied set has been read from the migration log
	LogReady,
	Running,
	Completed,
	Failed,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
	/// Ids executed by this run, in order
	pub applied: Vec<String>,
	/// Ids skipped because an earlier run applied them
	pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
struct CompositeGroup {
	name: String,
	temp_table: String,
	ids: Vec<String>,
}

/// Ordered migration registry and apply loop
///
/// The step creating the migration log is registered by every constructor, so it
/// always runs first.
///
/// # Examples
///
/// ```no_run
/// use schemata_db::backends::DatabaseConnection;
/// use schemata_db::migrations::{
///     ColumnMapping, ColumnType, Literal, MigrationStep, Migrator, SchemaColumn, SchemaTable,
///     replace_table,
/// };
///
/// # async fn example() {
/// let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
/// let mut migrator = Migrator::new(connection);
///
/// let v1 = SchemaTable::new("users")
///     .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
///     .column(SchemaColumn::new("name", ColumnType::NVarchar(255)));
/// migrator.register("create users table", MigrationStep::create_table(v1.clone())).unwrap();
///
/// let v2 = v1.clone()
///     .column(SchemaColumn::new("email", ColumnType::NVarchar(255)).default_value(Literal::text("")));
/// let plan = replace_table(&v1, &v2, 2, ColumnMapping::identity(&v1, &v2)).unwrap();
/// migrator.register_table_replace(plan).unwrap();
///
/// let report = migrator.start().await.unwrap();
/// assert_eq!(report.applied.len(), 6);
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
#[derive(Debug)]
pub struct Migrator {
	connection: DatabaseConnection,
	dialect: SqlDialect,
	log: MigrationLog,
	migrations: IndexMap<String, MigrationStep>,
	composites: Vec<CompositeGroup>,
	state: MigratorState,
}

impl Migrator {
	/// Migrator rendering for the backend family of `connection`
	pub fn new(connection: DatabaseConnection) -> Self {
		let dialect = SqlDialect::from(connection.database_type());
		Self::with_dialect(connection, dialect)
	}

	/// Migrator for a dialect named by the host, e.g. `"sqlite3"` or `"postgres"`
	///
	/// # Errors
	///
	/// `UnsupportedDialect` when no dialect exists for `dialect_name`,
	/// `DialectMismatch` when it names a different backend than `connection`.
	pub fn for_dialect(connection: DatabaseConnection, dialect_name: &str) -> Result<Self> {
		let dialect: SqlDialect = dialect_name.parse()?;
		let connected = SqlDialect::from(connection.database_type());
		if dialect != connected {
			tracing::error!(
				requested = %dialect,
				connection = %connected,
				"Dialect does not match the connection's database type"
			);
			return Err(MigrationError::DialectMismatch {
				requested: dialect.to_string(),
				connection: connected.to_string(),
			});
		}
		Ok(Self::with_dialect(connection, dialect))
	}

	pub fn with_dialect(connection: DatabaseConnection, dialect: SqlDialect) -> Self {
		let mut migrations = IndexMap::new();
		migrations.insert(
			MIGRATION_LOG_CREATE_ID.to_string(),
			MigrationStep::create_table(migration_log_table()),
		);
		Self {
			log: MigrationLog::new(connection.clone(), dialect),
			connection,
			dialect,
			migrations,
			composites: Vec::new(),
			state: MigratorState::Uninitialized,
		}
	}

	pub fn dialect(&self) -> SqlDialect {
		self.dialect
	}

	pub fn connection(&self) -> &DatabaseConnection {
		&self.connection
	}

	pub fn state(&self) -> MigratorState {
		self.state
	}

	pub fn migration_log(&self) -> &MigrationLog {
		&self.log
	}

	/// Registered ids in execution order
	pub fn migration_ids(&self) -> Vec<&str> {
		self.migrations.keys().map(String::as_str).collect()
	}

	pub fn get(&self, id: &str) -> Option<&MigrationStep> {
		self.migrations.get(id)
	}

	pub fn len(&self) -> usize {
		self.migrations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.migrations.is_empty()
	}

	/// Append a step to the registry
	///
	/// # Errors
	///
	/// `DuplicateMigrationId` when `id` is already registered; `InvalidSchema` or
	/// `InvalidMigration` when the step fails validation. The registry is unchanged
	/// on error.
	pub fn register(&mut self, id: impl Into<String>, step: MigrationStep) -> Result<()> {
		let id = id.into();
		self.check_new_id(&id)?;
		step.validate()?;
		self.check_against_registered(&step)?;
		self.migrations.insert(id, step);
		Ok(())
	}

	/// Append every sub-step of a table replace
	///
	/// Either all sub-steps are registered or none is.
	pub fn register_table_replace(&mut self, plan: TableReplacePlan) -> Result<()> {
		let mut seen = HashSet::new();
		for (id, step) in &plan.steps {
			self.check_new_id(id)?;
			if !seen.insert(id.as_str()) {
				return Err(MigrationError::DuplicateMigrationId(id.clone()));
			}
			step.validate()?;
		}

		let ids = plan.step_ids().into_iter().map(str::to_string).collect();
		for (id, step) in plan.steps {
			self.migrations.insert(id, step);
		}
		self.composites.push(CompositeGroup {
			name: plan.name,
			temp_table: plan.temp_table,
			ids,
		});
		Ok(())
	}

	/// Schema of `name` as left by the registered steps, if a registered
	/// `CreateTable` defines it and nothing later renames or drops it
	fn registered_table(&self, name: &str) -> Option<&SchemaTable> {
		for step in self.migrations.values().rev() {
			match step {
				MigrationStep::CreateTable(table) if table.name == name => return Some(table),
				MigrationStep::RenameTable { old_name, new_name }
					if old_name == name || new_name == name =>
				{
					return None;
				}
				MigrationStep::DropTable { name: dropped } if dropped == name => return None,
				_ => {}
			}
		}
		None
	}

	/// Reject column references that the registered schema already rules out
	fn check_against_registered(&self, step: &MigrationStep) -> Result<()> {
		match step {
			MigrationStep::CreateIndex { table, index } => match self.registered_table(table) {
				Some(schema) => schema.validate_index(index),
				None => Ok(()),
			},
			MigrationStep::CopyData {
				source, mapping, ..
			} => {
				let Some(schema) = self.registered_table(source) else {
					return Ok(());
				};
				for column in mapping.source_columns() {
					if schema.get_column(column).is_none() {
						return Err(MigrationError::InvalidMigration(format!(
							"copy reads unknown column '{}' of table '{}'",
							column, source
						)));
					}
				}
				Ok(())
			}
			_ => Ok(()),
		}
	}

	fn check_new_id(&self, id: &str) -> Result<()> {
		if id.trim().is_empty() {
			return Err(MigrationError::InvalidMigration(
				"migration id must not be empty".to_string(),
			));
		}
		if self.migrations.contains_key(id) {
			return Err(MigrationError::DuplicateMigrationId(id.to_string()));
		}
		Ok(())
	}

	/// Apply every registered step that has no successful log entry
	///
	/// Steps run in registration order. Each executed step gets exactly one log
	/// entry. The run stops at the first failing step.
	///
	/// # Errors
	///
	/// - `ConnectionError` when the connection is unusable; nothing ran
	/// - `ExecutionError` for a failing step, already recorded in the log
	/// - `PartialCompositeFailure` when the failing step belongs to a table replace
	///   whose earlier sub-steps have been applied
	/// - `DatabaseError` when the log itself cannot be read or written
	pub async fn start(&mut self) -> Result<MigrationReport> {
		self.state = MigratorState::Uninitialized;
		tracing::info!(
			dialect = %self.dialect,
			registered = self.migrations.len(),
			"Starting migrations"
		);

		if let Err(e) = self.connection.ping().await {
			self.state = MigratorState::Failed;
			tracing::error!(error = %e, "Migration connection is not usable");
			return Err(MigrationError::ConnectionError(e));
		}

		let mut applied = match self.log.load_applied().await {
			Ok(applied) => applied,
			Err(e) => {
				self.state = MigratorState::Failed;
				return Err(e);
			}
		};
		self.state = MigratorState::LogReady;
		tracing::debug!(applied = applied.len(), "Loaded migration log");

		self.state = MigratorState::Running;
		let dialect: &dyn Dialect = self.dialect.dialect();
		let mut report = MigrationReport::default();

		for (id, step) in &self.migrations {
			if applied.contains(id) {
				tracing::debug!(migration_id = %id, "Skipping applied migration");
				report.skipped.push(id.clone());
				continue;
			}

			let statements = step.render(dialect);
			let sql = statements.join("\n");
			tracing::info!(migration_id = %id, kind = step.kind(), "Executing migration");
			tracing::debug!(migration_id = %id, sql = %sql, "Rendered migration");

			match self.connection.execute_batch(&statements).await {
				Ok(()) => {
					if let Err(e) = self.log.record(id, &sql, true, None, Utc::now()).await {
						self.state = MigratorState::Failed;
						tracing::error!(migration_id = %id, error = %e, "Failed to record applied migration");
						return Err(e);
					}
					applied.insert(id.clone());
					report.applied.push(id.clone());
				}
				Err(e) => {
					let message = e.to_string();
					tracing::error!(migration_id = %id, sql = %sql, error = %message, "Migration failed");
					if let Err(log_error) = self
						.log
						.record(id, &sql, false, Some(&message), Utc::now())
						.await
					{
						tracing::warn!(
							migration_id = %id,
							error = %log_error,
							"Failed to record migration failure"
						);
					}
					self.state = MigratorState::Failed;
					return Err(self.failure(id, sql, message, &applied));
				}
			}
		}

		self.state = MigratorState::Completed;
		tracing::info!(
			applied = report.applied.len(),
			skipped = report.skipped.len(),
			"Migrations complete"
		);
		Ok(report)
	}

	/// Error for a failed step, naming the completed part of its table replace
	fn failure(
		&self,
		id: &str,
		sql: String,
		message: String,
		applied: &HashSet<String>,
	) -> MigrationError {
		let group = self
			.composites
			.iter()
			.find(|group| group.ids.iter().any(|member| member == id));
		if let Some(group) = group {
			let completed: Vec<String> = group
				.ids
				.iter()
				.take_while(|member| member.as_str() != id)
				.filter(|member| applied.contains(member.as_str()))
				.cloned()
				.collect();
			if !completed.is_empty() {
				return MigrationError::PartialCompositeFailure {
					composite: group.name.clone(),
					temporary_table: group.temp_table.clone(),
					completed,
					migration_id: id.to_string(),
					sql,
					message,
				};
			}
		}
		MigrationError::ExecutionError {
			migration_id: id.to_string(),
			sql,
			message,
		}
	}
}
