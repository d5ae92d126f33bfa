//! SQLite driver

use async_trait::async_trait;
use sqlx::{Column, Row as SqlxRow, SqlitePool, TypeInfo, ValueRef, sqlite::SqliteRow};
use std::sync::Arc;

use crate::backends::{
	backend::DatabaseBackend,
	error::Result,
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

/// SQLite database backend
pub struct SqliteBackend {
	pool: Arc<SqlitePool>,
}

impl SqliteBackend {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
		value: &'q QueryValue,
	) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
		match value {
			QueryValue::Null => query.bind(None::<String>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::String(s) => query.bind(s),
			// DATETIME columns hold naive UTC text
			QueryValue::Timestamp(dt) => query.bind(dt.naive_utc()),
		}
	}

	fn convert_row(sqlite_row: SqliteRow) -> Result<Row> {
		let mut row = Row::new();
		for (index, column) in sqlite_row.columns().iter().enumerate() {
			let value = if sqlite_row.try_get_raw(index)?.is_null() {
				QueryValue::Null
			} else if column.type_info().name().to_uppercase().contains("BOOL") {
				// Booleans are stored as 0/1; only the declared type tells them apart
				QueryValue::Bool(sqlite_row.try_get::<bool, _>(index)?)
			} else if let Ok(i) = sqlite_row.try_get::<i64, _>(index) {
				QueryValue::Int(i)
			} else {
				// Timestamps come back as text and are parsed on access
				QueryValue::String(sqlite_row.try_get::<String, _>(index)?)
			};
			row.insert(column.name().to_string(), value);
		}
		Ok(row)
	}
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let mut query = sqlx::query(sql);
		for param in &params {
			query = Self::bind_value(query, param);
		}
		let result = query.execute(self.pool.as_ref()).await?;
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let mut query = sqlx::query(sql);
		for param in &params {
			query = Self::bind_value(query, param);
		}
		let rows = query.fetch_all(self.pool.as_ref()).await?;
		rows.into_iter().map(Self::convert_row).collect()
	}

	async fn execute_batch(&self, statements: &[String]) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		for statement in statements {
			sqlx::query(statement).execute(&mut *tx).await?;
		}
		tx.commit().await?;
		Ok(())
	}
}
