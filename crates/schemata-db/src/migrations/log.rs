//! Migration log
//!
//! The `migration_log` table is the durable record of every step attempt. Rows are
//! only ever appended; a step counts as applied once it has a row with
//! `success = true`.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::Result;
use super::dialect::SqlDialect;
use super::schema::{ColumnType, SchemaColumn, SchemaTable};
use crate::backends::{DatabaseConnection, QueryValue};

pub const MIGRATION_LOG_TABLE: &str = "migration_log";

/// Id of the step creating the log table, always the first registered step
pub const MIGRATION_LOG_CREATE_ID: &str = "create migration_log table";

/// Schema of the log table
pub fn migration_log_table() -> SchemaTable {
	SchemaTable::new(MIGRATION_LOG_TABLE)
		.column(
			SchemaColumn::new("id", ColumnType::BigInt)
				.primary_key()
				.auto_increment(),
		)
		.column(SchemaColumn::new("migration_id", ColumnType::NVarchar(255)))
		.column(SchemaColumn::new("sql", ColumnType::Text))
		.column(SchemaColumn::new("success", ColumnType::Bool))
		.column(SchemaColumn::new("error", ColumnType::Text).nullable())
		.column(SchemaColumn::new("timestamp", ColumnType::DateTime))
}

/// One recorded attempt
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationLogEntry {
	pub id: i64,
	pub migration_id: String,
	pub sql: String,
	pub success: bool,
	pub error: Option<String>,
	pub timestamp: DateTime<Utc>,
}

/// Access to the `migration_log` table over the migrator's connection
#[derive(Debug, Clone)]
pub struct MigrationLog {
	connection: DatabaseConnection,
	dialect: SqlDialect,
}

impl MigrationLog {
	pub fn new(connection: DatabaseConnection, dialect: SqlDialect) -> Self {
		Self {
			connection,
			dialect,
		}
	}

	fn table(&self) -> String {
		self.dialect.dialect().quote_identifier(MIGRATION_LOG_TABLE)
	}

	fn columns(&self, names: &[&str]) -> String {
		let dialect = self.dialect.dialect();
		names
			.iter()
			.map(|name| dialect.quote_identifier(name))
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// Whether the log table has been created
	pub async fn exists(&self) -> Result<bool> {
		let sql = self.dialect.dialect().table_exists_sql();
		let rows = self
			.connection
			.fetch_all(&sql, vec![QueryValue::from(MIGRATION_LOG_TABLE)])
			.await?;
		Ok(!rows.is_empty())
	}

	/// Ids with at least one successful attempt
	///
	/// Empty when the log table does not exist yet.
	pub async fn load_applied(&self) -> Result<HashSet<String>> {
		if !self.exists().await? {
			return Ok(HashSet::new());
		}
		let sql = format!(
			"SELECT {} FROM {} WHERE {} = {}",
			self.columns(&["migration_id"]),
			self.table(),
			self.columns(&["success"]),
			self.dialect.dialect().placeholder(1)
		);
		let rows = self
			.connection
			.fetch_all(&sql, vec![QueryValue::Bool(true)])
			.await?;
		rows.iter()
			.map(|row| row.get::<String>("migration_id").map_err(Into::into))
			.collect()
	}

	/// Append one attempt
	pub async fn record(
		&self,
		migration_id: &str,
		sql: &str,
		success: bool,
		error: Option<&str>,
		timestamp: DateTime<Utc>,
	) -> Result<()> {
		let dialect = self.dialect.dialect();
		let mut params = vec![
			QueryValue::from(migration_id),
			QueryValue::from(sql),
			QueryValue::Bool(success),
			QueryValue::Timestamp(timestamp),
		];
		// An untyped NULL parameter is rejected by some drivers, so absence is inlined
		let error_sql = match error {
			Some(message) => {
				params.push(QueryValue::from(message));
				dialect.placeholder(5)
			}
			None => "NULL".to_string(),
		};
		let statement = format!(
			"INSERT INTO {} ({}) VALUES ({}, {}, {}, {}, {})",
			self.table(),
			self.columns(&["migration_id", "sql", "success", "timestamp", "error"]),
			dialect.placeholder(1),
			dialect.placeholder(2),
			dialect.placeholder(3),
			dialect.placeholder(4),
			error_sql
		);
		self.connection.execute(&statement, params).await?;
		Ok(())
	}

	/// Every recorded attempt in insertion order
	pub async fn entries(&self) -> Result<Vec<MigrationLogEntry>> {
		if !self.exists().await? {
			return Ok(Vec::new());
		}
		let sql = format!(
			"SELECT {} FROM {} ORDER BY {}",
			self.columns(&["id", "migration_id", "sql", "success", "error", "timestamp"]),
			self.table(),
			self.columns(&["id"])
		);
		let rows = self.connection.fetch_all(&sql, Vec::new()).await?;
		let mut entries = Vec::with_capacity(rows.len());
		for row in rows {
			entries.push(MigrationLogEntry {
				id: row.get("id")?,
				migration_id: row.get("migration_id")?,
				sql: row.get("sql")?,
				success: row.get("success")?,
				error: row.get_opt("error")?,
				timestamp: row.get("timestamp")?,
			});
		}
		Ok(entries)
	}
}
