//! # Schemata Test
//!
//! Shared rstest fixtures and SQLite inspection helpers for the schemata crates.
//!
//! ```rust,ignore
//! use rstest::*;
//! use schemata_db::DatabaseConnection;
//! use schemata_test::fixtures::*;
//!
//! #[rstest]
//! #[tokio::test]
//! async fn test_with_database(#[future] sqlite_connection: DatabaseConnection) {
//!     let connection = sqlite_connection.await;
//!     connection.ping().await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod inspect;

pub use fixtures::{TempDatabase, sqlite_connection, temp_database, users_v1, users_v2};
pub use inspect::{count_rows, index_names, log_rows, table_exists};
