//! Common type definitions for database abstraction

use super::error::DatabaseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
	Sqlite,
	Postgres,
	Mysql,
}

impl DatabaseType {
	/// Detect the database type from a connection URL scheme
	///
	/// # Examples
	///
	/// ```
	/// use schemata_db::backends::DatabaseType;
	///
	/// assert_eq!(DatabaseType::from_url("sqlite::memory:"), Some(DatabaseType::Sqlite));
	/// assert_eq!(DatabaseType::from_url("postgres://localhost/app"), Some(DatabaseType::Postgres));
	/// assert_eq!(DatabaseType::from_url("mysql://root@localhost/app"), Some(DatabaseType::Mysql));
	/// assert_eq!(DatabaseType::from_url("mongodb://localhost"), None);
	/// ```
	pub fn from_url(url: &str) -> Option<Self> {
		let scheme = url.split(':').next().unwrap_or_default();
		match scheme {
			"sqlite" | "sqlite3" | "file" => Some(DatabaseType::Sqlite),
			"postgres" | "postgresql" => Some(DatabaseType::Postgres),
			"mysql" | "mariadb" => Some(DatabaseType::Mysql),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			DatabaseType::Sqlite => "sqlite3",
			DatabaseType::Postgres => "postgres",
			DatabaseType::Mysql => "mysql",
		}
	}
}

impl std::fmt::Display for DatabaseType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Query value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	String(String),
	Timestamp(chrono::DateTime<chrono::Utc>),
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i as i64)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

impl From<chrono::DateTime<chrono::Utc>> for QueryValue {
	fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
		QueryValue::Timestamp(dt)
	}
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(QueryValue::Null)
	}
}

/// Query result
#[derive(Debug, Clone)]
pub struct QueryResult {
	pub rows_affected: u64,
}

/// Row from query result
#[derive(Debug, Clone, Default)]
pub struct Row {
	pub(crate) data: HashMap<String, QueryValue>,
}

impl Row {
	pub fn new() -> Self {
		Self {
			data: HashMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: QueryValue) {
		self.data.insert(key, value);
	}

	/// Raw access to a column value
	pub fn value(&self, key: &str) -> Option<&QueryValue> {
		self.data.get(key)
	}

	pub fn get<T: TryFrom<QueryValue>>(&self, key: &str) -> std::result::Result<T, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		self.data
			.get(key)
			.cloned()
			.ok_or_else(|| DatabaseError::ColumnNotFound(key.to_string()))
			.and_then(|v| v.try_into().map_err(Into::into))
	}

	/// Like [`Row::get`], but maps SQL NULL to `None`
	pub fn get_opt<T: TryFrom<QueryValue>>(
		&self,
		key: &str,
	) -> std::result::Result<Option<T>, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		match self.data.get(key) {
			None => Err(DatabaseError::ColumnNotFound(key.to_string())),
			Some(QueryValue::Null) => Ok(None),
			Some(value) => value.clone().try_into().map(Some).map_err(Into::into),
		}
	}
}

// Type conversions for QueryValue
impl TryFrom<QueryValue> for i64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			QueryValue::Bool(b) => Ok(b as i64),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to i64",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to String",
				value
			))),
		}
	}
}

// MySQL TINYINT(1) and SQLite INTEGER both come back as integers
impl TryFrom<QueryValue> for bool {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			QueryValue::Int(i) => Ok(i != 0),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to bool",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for chrono::DateTime<chrono::Utc> {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Timestamp(dt) => Ok(dt),
			// SQLite keeps date-times as text
			QueryValue::String(ref s) => parse_timestamp(s).ok_or_else(|| {
				DatabaseError::TypeError(format!("Failed to parse timestamp '{}'", s))
			}),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to DateTime<Utc>",
				value
			))),
		}
	}
}

fn parse_timestamp(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
	if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
		return Some(dt.with_timezone(&chrono::Utc));
	}
	["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
		.iter()
		.find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
		.map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Datelike, Timelike};
	use rstest::rstest;

	#[rstest]
	#[case("sqlite:data/app.db", Some(DatabaseType::Sqlite))]
	#[case("file:data/app.db?mode=rwc", Some(DatabaseType::Sqlite))]
	#[case("postgresql://user@localhost/app", Some(DatabaseType::Postgres))]
	#[case("mariadb://localhost/app", Some(DatabaseType::Mysql))]
	#[case("mssql://localhost/app", None)]
	fn test_database_type_from_url(#[case] url: &str, #[case] expected: Option<DatabaseType>) {
		assert_eq!(DatabaseType::from_url(url), expected);
	}

	#[test]
	fn test_row_get_missing_column() {
		let row = Row::new();
		let result: std::result::Result<String, _> = row.get("missing");
		assert!(matches!(result, Err(DatabaseError::ColumnNotFound(_))));
	}

	#[test]
	fn test_row_get_bool_from_int() {
		let mut row = Row::new();
		row.insert("success".to_string(), QueryValue::Int(1));
		row.insert("failed".to_string(), QueryValue::Int(0));

		assert!(row.get::<bool>("success").unwrap());
		assert!(!row.get::<bool>("failed").unwrap());
	}

	#[test]
	fn test_row_get_opt_null() {
		let mut row = Row::new();
		row.insert("error".to_string(), QueryValue::Null);
		row.insert("sql".to_string(), QueryValue::from("SELECT 1"));

		assert_eq!(row.get_opt::<String>("error").unwrap(), None);
		assert_eq!(
			row.get_opt::<String>("sql").unwrap(),
			Some("SELECT 1".to_string())
		);
	}

	#[rstest]
	#[case("2026-10-18 09:30:15")]
	#[case("2026-10-18 09:30:15.250")]
	#[case("2026-10-18T09:30:15Z")]
	fn test_timestamp_from_sqlite_text(#[case] text: &str) {
		let dt: chrono::DateTime<chrono::Utc> = QueryValue::from(text).try_into().unwrap();
		assert_eq!(dt.year(), 2026);
		assert_eq!(dt.month(), 10);
		assert_eq!(dt.hour(), 9);
		assert_eq!(dt.second(), 15);
	}

	#[test]
	fn test_option_into_query_value() {
		assert_eq!(QueryValue::from(None::<String>), QueryValue::Null);
		assert_eq!(
			QueryValue::from(Some("boom".to_string())),
			QueryValue::String("boom".to_string())
		);
	}
}
