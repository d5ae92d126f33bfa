//! SQL dialects
//!
//! A [`Dialect`] turns the schema model into backend-native statement text. Every
//! method is pure; executing the text is the migrator's job.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::fmt;
use std::str::FromStr;

use super::mapping::{ColumnMapping, ColumnSource};
use super::schema::{ColumnType, Literal, SchemaColumn, SchemaIndex, SchemaTable};
use super::{MigrationError, Result};
use crate::backends::DatabaseType;

/// Backend family a migration run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
	Sqlite,
	Postgres,
	Mysql,
}

impl SqlDialect {
	/// Renderer for this backend family
	pub fn dialect(&self) -> &'static dyn Dialect {
		match self {
			SqlDialect::Sqlite => &SqliteDialect,
			SqlDialect::Postgres => &PostgresDialect,
			SqlDialect::Mysql => &MySqlDialect,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SqlDialect::Sqlite => "sqlite3",
			SqlDialect::Postgres => "postgres",
			SqlDialect::Mysql => "mysql",
		}
	}
}

impl fmt::Display for SqlDialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SqlDialect {
	type Err = MigrationError;

	/// Parse a dialect identifier as hosts name them (`sqlite3`, `postgres`, `mysql`, ...)
	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sqlite3" | "sqlite" => Ok(SqlDialect::Sqlite),
			"postgres" | "postgresql" => Ok(SqlDialect::Postgres),
			"mysql" | "mariadb" => Ok(SqlDialect::Mysql),
			_ => Err(MigrationError::UnsupportedDialect(s.to_string())),
		}
	}
}

impl From<DatabaseType> for SqlDialect {
	fn from(database_type: DatabaseType) -> Self {
		match database_type {
			DatabaseType::Sqlite => SqlDialect::Sqlite,
			DatabaseType::Postgres => SqlDialect::Postgres,
			DatabaseType::Mysql => SqlDialect::Mysql,
		}
	}
}

/// Backend-specific statement renderer
///
/// Required methods cover what genuinely differs between backends; the provided
/// ones assemble statements from those pieces and are overridden only where a
/// backend needs a different shape.
pub trait Dialect: Send + Sync {
	fn kind(&self) -> SqlDialect;

	fn quote_identifier(&self, name: &str) -> String;

	/// Native DDL type for a logical column type
	fn native_type(&self, column_type: ColumnType) -> String;

	/// One column of a CREATE TABLE body
	///
	/// `inline_primary_key` is set when the column is the table's only primary key
	/// column.
	fn column_definition(&self, column: &SchemaColumn, inline_primary_key: bool) -> String;

	/// Bind parameter marker for the 1-based parameter `index`
	fn placeholder(&self, index: usize) -> String;

	fn bool_literal(&self, value: bool) -> &'static str;

	fn string_literal(&self, value: &str) -> String;

	/// Query returning one row when the table named by parameter 1 exists
	fn table_exists_sql(&self) -> String;

	fn drop_index_sql(&self, table: &str, index: &SchemaIndex) -> String;

	fn literal_sql(&self, literal: &Literal) -> String {
		match literal {
			Literal::Null => "NULL".to_string(),
			Literal::Bool(value) => self.bool_literal(*value).to_string(),
			Literal::Int(value) => value.to_string(),
			Literal::Float(value) => value.to_string(),
			Literal::Text(value) => self.string_literal(value),
			Literal::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
			Literal::Raw(sql) => sql.clone(),
		}
	}

	/// Trailing table options, such as a storage engine
	fn table_options(&self) -> Option<&'static str> {
		None
	}

	fn create_table_sql(&self, table: &SchemaTable) -> String {
		let primary_key = table.primary_key_columns();
		let inline = primary_key.len() == 1;

		let mut parts: Vec<String> = table
			.columns
			.iter()
			.map(|column| {
				format!(
					"  {}",
					self.column_definition(column, inline && column.primary_key)
				)
			})
			.collect();
		if primary_key.len() > 1 {
			let columns: Vec<String> = primary_key
				.iter()
				.map(|column| self.quote_identifier(&column.name))
				.collect();
			parts.push(format!("  PRIMARY KEY ({})", columns.join(", ")));
		}

		let mut sql = format!(
			"CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
			self.quote_identifier(&table.name),
			parts.join(",\n")
		);
		if let Some(options) = self.table_options() {
			sql.push(' ');
			sql.push_str(options);
		}
		sql.push(';');
		sql
	}

	/// The index name must already be resolved
	fn create_index_sql(&self, table: &str, index: &SchemaIndex) -> String {
		let unique = if index.unique { "UNIQUE " } else { "" };
		let columns: Vec<String> = index
			.columns
			.iter()
			.map(|column| self.quote_identifier(column))
			.collect();
		format!(
			"CREATE {}INDEX {} ON {} ({});",
			unique,
			self.quote_identifier(&index.resolved_name(table)),
			self.quote_identifier(table),
			columns.join(", ")
		)
	}

	fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
		format!(
			"ALTER TABLE {} RENAME TO {};",
			self.quote_identifier(old_name),
			self.quote_identifier(new_name)
		)
	}

	/// INSERT ... SELECT populating `target` from `source`
	///
	/// Destination columns the mapping leaves out (or ignores) are not named, so the
	/// database fills them from their declared default.
	fn copy_data_sql(&self, source: &str, target: &str, mapping: &ColumnMapping) -> String {
		let mut columns = Vec::new();
		let mut expressions = Vec::new();
		for (destination, source_column) in mapping.entries() {
			let expression = match source_column {
				ColumnSource::Column(name) => self.quote_identifier(name),
				ColumnSource::Literal(literal) => self.literal_sql(literal),
				ColumnSource::Ignore => continue,
			};
			columns.push(self.quote_identifier(destination));
			expressions.push(expression);
		}
		format!(
			"INSERT INTO {} ({}) SELECT {} FROM {};",
			self.quote_identifier(target),
			columns.join(", "),
			expressions.join(", "),
			self.quote_identifier(source)
		)
	}

	/// Statement to run after copying rows into `target`, if the backend needs one
	fn post_copy_sql(&self, _target: &SchemaTable, _mapping: &ColumnMapping) -> Option<String> {
		None
	}

	fn drop_table_sql(&self, name: &str) -> String {
		format!("DROP TABLE {};", self.quote_identifier(name))
	}
}

/// Shared column rendering: `<name> <type> [PRIMARY KEY | NOT NULL] [DEFAULT <literal>]`
pub(crate) fn generic_column_definition<D: Dialect + ?Sized>(
	dialect: &D,
	column: &SchemaColumn,
	type_sql: &str,
	inline_primary_key: bool,
) -> String {
	let mut sql = format!("{} {}", dialect.quote_identifier(&column.name), type_sql);
	if inline_primary_key {
		sql.push_str(" PRIMARY KEY");
	} else if !column.nullable {
		sql.push_str(" NOT NULL");
	}
	if let Some(default) = &column.default {
		sql.push_str(" DEFAULT ");
		sql.push_str(&dialect.literal_sql(default));
	}
	sql
}

/// Quote with `quote`, doubling any embedded quote character
pub(crate) fn quote_with(name: &str, quote: char) -> String {
	let mut quoted = String::with_capacity(name.len() + 2);
	quoted.push(quote);
	for c in name.chars() {
		if c == quote {
			quoted.push(quote);
		}
		quoted.push(c);
	}
	quoted.push(quote);
	quoted
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("sqlite3", SqlDialect::Sqlite)]
	#[case("sqlite", SqlDialect::Sqlite)]
	#[case("postgres", SqlDialect::Postgres)]
	#[case("PostgreSQL", SqlDialect::Postgres)]
	#[case("mysql", SqlDialect::Mysql)]
	#[case("mariadb", SqlDialect::Mysql)]
	fn test_parse_dialect(#[case] name: &str, #[case] expected: SqlDialect) {
		assert_eq!(name.parse::<SqlDialect>().unwrap(), expected);
	}

	#[rstest]
	#[case("oracle")]
	#[case("mssql")]
	#[case("")]
	fn test_parse_unsupported_dialect(#[case] name: &str) {
		let err = name.parse::<SqlDialect>().unwrap_err();
		assert!(matches!(err, MigrationError::UnsupportedDialect(ref n) if n == name));
	}

	#[test]
	fn test_dialect_kind_matches() {
		for kind in [SqlDialect::Sqlite, SqlDialect::Postgres, SqlDialect::Mysql] {
			assert_eq!(kind.dialect().kind(), kind);
		}
	}

	#[test]
	fn test_from_database_type() {
		assert_eq!(SqlDialect::from(DatabaseType::Sqlite), SqlDialect::Sqlite);
		assert_eq!(SqlDialect::from(DatabaseType::Postgres), SqlDialect::Postgres);
		assert_eq!(SqlDialect::from(DatabaseType::Mysql), SqlDialect::Mysql);
	}

	#[test]
	fn test_quote_with_escapes() {
		assert_eq!(quote_with("plain", '"'), "\"plain\"");
		assert_eq!(quote_with("we\"ird", '"'), "\"we\"\"ird\"");
		assert_eq!(quote_with("back`tick", '`'), "`back``tick`");
	}

	#[test]
	fn test_copy_skips_ignored_columns() {
		let mapping = ColumnMapping::new()
			.column("id", "id")
			.literal("email", Literal::text(""))
			.ignore("created");
		let sql = SqliteDialect.copy_data_sql("users_tmp_qwerty", "users", &mapping);
		assert_eq!(
			sql,
			"INSERT INTO `users` (`id`, `email`) SELECT `id`, '' FROM `users_tmp_qwerty`;"
		);
	}

	#[test]
	fn test_index_order_is_kept_in_ddl() {
		let index = SchemaIndex::new(["b", "a"]);
		let sql = SqliteDialect.create_index_sql("t", &index);
		assert_eq!(sql, "CREATE INDEX `IDX_t_b_a` ON `t` (`b`, `a`);");
	}
}
