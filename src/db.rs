//! Database backends and the migration engine.
//!
//! # Examples
//!
//! ```rust,no_run
//! use schemata::db::backends::DatabaseConnection;
//! use schemata::db::migrations::Migrator;
//! ```

pub use schemata_db::*;
