//! MySQL driver

use async_trait::async_trait;
use sqlx::{Column, MySqlPool, Row as SqlxRow, TypeInfo, ValueRef, mysql::MySqlRow};
use std::sync::Arc;

use crate::backends::{
	backend::DatabaseBackend,
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

/// MySQL database backend
pub struct MySqlBackend {
	pool: Arc<MySqlPool>,
}

impl MySqlBackend {
	pub fn new(pool: MySqlPool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &MySqlPool {
		&self.pool
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
		value: &'q QueryValue,
	) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
		match value {
			QueryValue::Null => query.bind(None::<String>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Timestamp(dt) => query.bind(dt.naive_utc()),
		}
	}

	fn convert_row(mysql_row: MySqlRow) -> Result<Row> {
		let mut row = Row::new();
		for (index, column) in mysql_row.columns().iter().enumerate() {
			let type_name = column.type_info().name();
			let value = if mysql_row.try_get_raw(index)?.is_null() {
				QueryValue::Null
			} else if type_name == "BOOLEAN" {
				QueryValue::Bool(mysql_row.try_get(index)?)
			} else if type_name.contains("INT") {
				QueryValue::Int(mysql_row.try_get_unchecked(index)?)
			} else if matches!(type_name, "DATETIME" | "TIMESTAMP") {
				QueryValue::Timestamp(mysql_row.try_get::<chrono::NaiveDateTime, _>(index)?.and_utc())
			} else {
				// information_schema reports some text columns as binary
				let bytes: Vec<u8> = mysql_row.try_get_unchecked(index)?;
				QueryValue::String(String::from_utf8(bytes).map_err(|e| {
					DatabaseError::TypeError(format!("Invalid UTF-8 in column {}: {}", column.name(), e))
				})?)
			};
			row.insert(column.name().to_string(), value);
		}
		Ok(row)
	}
}

#[async_trait]
impl DatabaseBackend for MySqlBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Mysql
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
		// MySQL commits DDL implicitly; the transaction only covers DML statements
		let mut tx = self.pool.begin().await?;
		for statement in statements {
			sqlx::query(statement).execute(&mut *tx).await?;
		}
		tx.commit().await?;
		Ok(())
	}
}
