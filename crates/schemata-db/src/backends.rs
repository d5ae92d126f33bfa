//! # Database Backends
//!
//! Low-level connection abstraction used by the migration engine.
//!
//! ## Supported Databases
//!
//! | Database | Feature Flag | Backend Type |
//! |----------|--------------|--------------|
//! | SQLite | `sqlite` | [`SqliteBackend`] |
//! | PostgreSQL | `postgres` | [`PostgresBackend`] |
//! | MySQL/MariaDB | `mysql` | [`MySqlBackend`] |
//!
//! ## Core Types
//!
//! - **[`DatabaseBackend`]**: trait implemented by each driver (execute, fetch, batch)
//! - **[`DatabaseConnection`]**: cheap-clone handle the migrator holds
//! - **[`Row`] / [`QueryValue`]**: backend-independent result values

pub mod backend;
pub mod connection;
pub mod drivers;
pub mod error;
pub mod types;

pub use backend::DatabaseBackend;
pub use connection::DatabaseConnection;
pub use error::{DatabaseError, Result};
pub use types::{DatabaseType, QueryResult, QueryValue, Row};

#[cfg(feature = "mysql")]
pub use drivers::mysql::MySqlBackend;
#[cfg(feature = "postgres")]
pub use drivers::postgres::PostgresBackend;
#[cfg(feature = "sqlite")]
pub use drivers::sqlite::SqliteBackend;
