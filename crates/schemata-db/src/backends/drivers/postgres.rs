//! PostgreSQL driver

use async_trait::async_trait;
use sqlx::{Column, PgPool, Row as SqlxRow, TypeInfo, ValueRef, postgres::PgRow};
use std::sync::Arc;

use crate::backends::{
	backend::DatabaseBackend,
	error::Result,
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

/// PostgreSQL database backend
pub struct PostgresBackend {
	pool: Arc<PgPool>,
}

impl PostgresBackend {
	pub fn new(pool: PgPool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
		value: &'q QueryValue,
	) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
		match value {
			QueryValue::Null => query.bind(None::<String>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::String(s) => query.bind(s),
			// Schema DATETIME maps to TIMESTAMP (without time zone)
			QueryValue::Timestamp(dt) => query.bind(dt.naive_utc()),
		}
	}

	fn convert_row(pg_row: PgRow) -> Result<Row> {
		let mut row = Row::new();
		for (index, column) in pg_row.columns().iter().enumerate() {
			let value = if pg_row.try_get_raw(index)?.is_null() {
				QueryValue::Null
			} else {
				match column.type_info().name() {
					"BOOL" => QueryValue::Bool(pg_row.try_get(index)?),
					"INT2" => QueryValue::Int(pg_row.try_get::<i16, _>(index)?.into()),
					"INT4" => QueryValue::Int(pg_row.try_get::<i32, _>(index)?.into()),
					"INT8" => QueryValue::Int(pg_row.try_get(index)?),
					"TIMESTAMP" => {
						QueryValue::Timestamp(pg_row.try_get::<chrono::NaiveDateTime, _>(index)?.and_utc())
					}
					"TIMESTAMPTZ" => QueryValue::Timestamp(pg_row.try_get(index)?),
					// information_schema names are domains over `name`
					_ => QueryValue::String(pg_row.try_get_unchecked(index)?),
				}
			};
			row.insert(column.name().to_string(), value);
		}
		Ok(row)
	}
}

#[async_trait]
impl DatabaseBackend for PostgresBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Postgres
	}

	fn placeholder(&self, index: usize) -> String {
		format!("${}", index)
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
		// PostgreSQL DDL is transactional, so a step is all-or-nothing here
		let mut tx = self.pool.begin().await?;
		for statement in statements {
			sqlx::query(statement).execute(&mut *tx).await?;
		}
		tx.commit().await?;
		Ok(())
	}
}
