//! Database connection management

use std::sync::Arc;

use super::{
	backend::DatabaseBackend,
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

#[cfg(feature = "postgres")]
use super::drivers::postgres::PostgresBackend;

#[cfg(feature = "sqlite")]
use super::drivers::sqlite::SqliteBackend;

#[cfg(feature = "mysql")]
use super::drivers::mysql::MySqlBackend;

/// Database connection wrapper
///
/// Connections opened through the `connect_*` constructors are single-session:
/// the underlying pool holds one connection that is never reaped, so every
/// statement issued through this handle runs on the same session.
#[derive(Clone)]
pub struct DatabaseConnection {
	backend: Arc<dyn DatabaseBackend>,
}

impl std::fmt::Debug for DatabaseConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatabaseConnection")
			.field("database_type", &self.database_type())
			.finish()
	}
}

impl DatabaseConnection {
	pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
		Self { backend }
	}

	/// Connect using the driver matching the URL scheme
	///
	/// # Examples
	///
	/// ```no_run
	/// use schemata_db::backends::{DatabaseConnection, DatabaseType};
	///
	/// # async fn example() {
	/// let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
	/// assert_eq!(connection.database_type(), DatabaseType::Sqlite);
	/// # }
	/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
	/// ```
	pub async fn connect(url: &str) -> Result<Self> {
		Self::connect_with(url, true).await
	}

	/// Like [`DatabaseConnection::connect`]; `log_statements = false` silences
	/// sqlx's per-statement logging
	pub async fn connect_with(url: &str, log_statements: bool) -> Result<Self> {
		match DatabaseType::from_url(url) {
			#[cfg(feature = "sqlite")]
			Some(DatabaseType::Sqlite) => Self::connect_sqlite(url, log_statements).await,
			#[cfg(feature = "postgres")]
			Some(DatabaseType::Postgres) => Self::connect_postgres(url, log_statements).await,
			#[cfg(feature = "mysql")]
			Some(DatabaseType::Mysql) => Self::connect_mysql(url, log_statements).await,
			_ => Err(DatabaseError::UnsupportedDatabase(
				url.split(':').next().unwrap_or_default().to_string(),
			)),
		}
	}

	#[cfg(feature = "postgres")]
	pub async fn connect_postgres(url: &str, log_statements: bool) -> Result<Self> {
		use sqlx::ConnectOptions;
		use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
		use std::str::FromStr;

		let mut options = PgConnectOptions::from_str(url)?;
		if !log_statements {
			options = options.disable_statement_logging();
		}
		let pool = PgPoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?;
		Ok(Self {
			backend: Arc::new(PostgresBackend::new(pool)),
		})
	}

	#[cfg(feature = "sqlite")]
	pub async fn connect_sqlite(url: &str, log_statements: bool) -> Result<Self> {
		use sqlx::ConnectOptions;
		use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
		use std::str::FromStr;

		// Host configuration may use `file:` or `sqlite3:`; sqlx expects `sqlite:`
		let url = match url
			.strip_prefix("file:")
			.or_else(|| url.strip_prefix("sqlite3:"))
		{
			Some(rest) => format!("sqlite:{}", rest),
			None => url.to_string(),
		};
		let mut options = SqliteConnectOptions::from_str(&url)?;
		if !log_statements {
			options = options.disable_statement_logging();
		}
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?;
		Ok(Self {
			backend: Arc::new(SqliteBackend::new(pool)),
		})
	}

	/// Wrap an existing pool
	///
	/// The pool should be limited to one connection when it points at an
	/// in-memory database, otherwise each connection sees its own database.
	#[cfg(feature = "sqlite")]
	pub fn from_sqlite_pool(pool: sqlx::SqlitePool) -> Self {
		Self {
			backend: Arc::new(SqliteBackend::new(pool)),
		}
	}

	#[cfg(feature = "mysql")]
	pub async fn connect_mysql(url: &str, log_statements: bool) -> Result<Self> {
		use sqlx::ConnectOptions;
		use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
		use std::str::FromStr;

		let url = match url.strip_prefix("mariadb:") {
			Some(rest) => format!("mysql:{}", rest),
			None => url.to_string(),
		};
		let mut options = MySqlConnectOptions::from_str(&url)?;
		if !log_statements {
			options = options.disable_statement_logging();
		}
		let pool = MySqlPoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?;
		Ok(Self {
			backend: Arc::new(MySqlBackend::new(pool)),
		})
	}

	pub fn backend(&self) -> Arc<dyn DatabaseBackend> {
		self.backend.clone()
	}

	/// Get the database type
	pub fn database_type(&self) -> DatabaseType {
		self.backend.database_type()
	}

	pub fn placeholder(&self, index: usize) -> String {
		self.backend.placeholder(index)
	}

	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		self.backend.execute(sql, params).await
	}

	pub async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		self.backend.fetch_all(sql, params).await
	}

	pub async fn execute_batch(&self, statements: &[String]) -> Result<()> {
		self.backend.execute_batch(statements).await
	}

	pub async fn ping(&self) -> Result<()> {
		self.backend.ping().await
	}
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_connect_in_memory_sqlite() {
		let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
		assert_eq!(connection.database_type(), DatabaseType::Sqlite);
		connection.ping().await.unwrap();
	}

	#[tokio::test]
	async fn test_single_session_keeps_in_memory_state() {
		let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
		connection
			.execute("CREATE TABLE t (id INTEGER)", vec![])
			.await
			.unwrap();
		connection
			.execute("INSERT INTO t (id) VALUES (?)", vec![7.into()])
			.await
			.unwrap();

		let rows = connection
			.fetch_all("SELECT id FROM t", vec![])
			.await
			.unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].get::<i64>("id").unwrap(), 7);
	}

	#[tokio::test]
	async fn test_log_column_types_decode() {
		let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
		connection
			.execute(
				"CREATE TABLE entry (id INTEGER, ok BOOLEAN, error TEXT, at DATETIME)",
				vec![],
			)
			.await
			.unwrap();
		let at = chrono::DateTime::parse_from_rfc3339("2026-10-18T09:30:15Z")
			.unwrap()
			.with_timezone(&chrono::Utc);
		connection
			.execute(
				"INSERT INTO entry (id, ok, error, at) VALUES (?, ?, ?, ?)",
				vec![1.into(), true.into(), QueryValue::Null, at.into()],
			)
			.await
			.unwrap();

		let rows = connection
			.fetch_all("SELECT id, ok, error, at FROM entry", vec![])
			.await
			.unwrap();
		let row = &rows[0];
		assert_eq!(row.value("id"), Some(&QueryValue::Int(1)));
		assert_eq!(row.value("ok"), Some(&QueryValue::Bool(true)));
		assert_eq!(row.value("error"), Some(&QueryValue::Null));
		assert_eq!(row.get::<chrono::DateTime<chrono::Utc>>("at").unwrap(), at);
	}

	#[tokio::test]
	async fn test_execute_batch_rolls_back_on_failure() {
		let connection = DatabaseConnection::connect("sqlite::memory:").await.unwrap();
		let statements = vec![
			"CREATE TABLE kept (id INTEGER)".to_string(),
			"CREATE TABLE broken (".to_string(),
		];

		let result = connection.execute_batch(&statements).await;
		assert!(matches!(result, Err(DatabaseError::QueryError(_))));

		let rows = connection
			.fetch_all(
				"SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'kept'",
				vec![],
			)
			.await
			.unwrap();
		assert!(rows.is_empty(), "first statement must be rolled back");
	}

	#[tokio::test]
	async fn test_connect_unsupported_scheme() {
		let result = DatabaseConnection::connect("oracle://localhost/db").await;
		assert!(matches!(result, Err(DatabaseError::UnsupportedDatabase(s)) if s == "oracle"));
	}
}
