//! # Schemata Conf
//!
//! Settings for hosts that run schemata migrations: the `[database]` section,
//! read from TOML or from a single database URL, and the connection string
//! assembled from it.
//!
//! ## Example
//!
//! ```
//! use schemata_conf::Settings;
//!
//! let settings = Settings::from_toml_str(
//! 	r#"
//! data_path = "/var/lib/app"
//!
//! [database]
//! type = "sqlite3"
//! path = "app.db"
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(
//! 	settings.connection_string().unwrap(),
//! 	"sqlite:///var/lib/app/app.db?mode=rwc&cache=private"
//! );
//! ```

pub mod database;
pub mod settings;

pub use database::DatabaseConfig;
pub use settings::Settings;

/// Configuration errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Invalid database URL: {0}")]
	InvalidUrl(String),

	#[error("Missing value: {0}")]
	MissingValue(String),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Unknown database type: {0}")]
	UnknownDatabaseType(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
