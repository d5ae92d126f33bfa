//! Settings module.
//!
//! # Examples
//!
//! ```rust
//! use schemata::conf::Settings;
//!
//! let settings = Settings::from_toml_str("[database]\ntype = \"sqlite3\"\n").unwrap();
//! assert_eq!(settings.database.db_type, "sqlite3");
//! ```

pub use schemata_conf::*;
