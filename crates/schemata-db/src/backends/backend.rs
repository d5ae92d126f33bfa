//! Backend trait implemented by each database driver

use async_trait::async_trait;

use super::{
	error::Result,
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

/// Core database backend trait
///
/// Every method runs against the same underlying session; drivers created through
/// [`DatabaseConnection`](super::DatabaseConnection) hold exactly one physical
/// connection.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
	/// Returns the database type
	fn database_type(&self) -> DatabaseType;

	/// Generates a bind placeholder for the given 1-based parameter index
	fn placeholder(&self, index: usize) -> String;

	/// Executes a single statement
	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult>;

	/// Fetches all rows of a query
	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>>;

	/// Executes the statements in order inside one transaction
	///
	/// Either every statement is committed or the transaction is rolled back at the
	/// first failure. Backends that implicitly commit DDL (MySQL) only guarantee
	/// the ordering part.
	async fn execute_batch(&self, statements: &[String]) -> Result<()>;

	/// Checks that the connection is usable
	async fn ping(&self) -> Result<()> {
		self.fetch_all("SELECT 1", vec![]).await.map(|_| ())
	}
}
