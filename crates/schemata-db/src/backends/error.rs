//! Database error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
	/// The connection or pool cannot be used (unreachable server, closed pool, TLS, IO)
	#[error("Connection error: {0}")]
	ConnectionError(String),

	#[error("Query error: {0}")]
	QueryError(String),

	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	#[error("Type error: {0}")]
	TypeError(String),

	#[error("Unsupported database: {0}")]
	UnsupportedDatabase(String),
}

impl DatabaseError {
	/// Whether the error means the connection itself is unusable
	pub fn is_connection_error(&self) -> bool {
		matches!(self, DatabaseError::ConnectionError(_))
	}
}

impl From<sqlx::Error> for DatabaseError {
	fn from(err: sqlx::Error) -> Self {
		match err {
			sqlx::Error::Configuration(_)
			| sqlx::Error::Io(_)
			| sqlx::Error::Tls(_)
			| sqlx::Error::PoolTimedOut
			| sqlx::Error::PoolClosed
			| sqlx::Error::WorkerCrashed => DatabaseError::ConnectionError(err.to_string()),
			sqlx::Error::ColumnNotFound(name) => DatabaseError::ColumnNotFound(name),
			sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
				DatabaseError::TypeError(err.to_string())
			}
			sqlx::Error::Database(db_err) => DatabaseError::QueryError(db_err.message().to_string()),
			other => DatabaseError::QueryError(other.to_string()),
		}
	}
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pool_errors_are_connection_errors() {
		let err: DatabaseError = sqlx::Error::PoolClosed.into();
		assert!(err.is_connection_error());

		let err: DatabaseError = sqlx::Error::PoolTimedOut.into();
		assert!(err.is_connection_error());
	}

	#[test]
	fn test_row_not_found_is_query_error() {
		let err: DatabaseError = sqlx::Error::RowNotFound.into();
		assert!(matches!(err, DatabaseError::QueryError(_)));
		assert!(!err.is_connection_error());
	}

	#[test]
	fn test_column_not_found_keeps_name() {
		let err: DatabaseError = sqlx::Error::ColumnNotFound("migration_id".to_string()).into();
		match err {
			DatabaseError::ColumnNotFound(name) => assert_eq!(name, "migration_id"),
			other => panic!("unexpected error: {other:?}"),
		}
	}
}
