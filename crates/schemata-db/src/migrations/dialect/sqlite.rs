use super::{Dialect, SqlDialect, generic_column_definition, quote_with};
use crate::migrations::schema::{ColumnType, SchemaColumn, SchemaIndex};

/// SQLite renderer
///
/// SQLite has no length-bounded text type, so `CHAR`/`VARCHAR` columns become
/// `TEXT` with a `CHECK (length(..) <= n)` constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
	fn kind(&self) -> SqlDialect {
		SqlDialect::Sqlite
	}

	// Backticks never fall back to a string literal the way an unresolved
	// double-quoted name does
	fn quote_identifier(&self, name: &str) -> String {
		quote_with(name, '`')
	}

	fn native_type(&self, column_type: ColumnType) -> String {
		match column_type {
			ColumnType::BigInt | ColumnType::Int | ColumnType::SmallInt => "INTEGER".to_string(),
			ColumnType::Char(_)
			| ColumnType::Varchar(_)
			| ColumnType::NVarchar(_)
			| ColumnType::Text
			| ColumnType::MediumText
			| ColumnType::Uuid => "TEXT".to_string(),
			// Declared as BOOLEAN so reads can tell booleans from integers
			ColumnType::Bool => "BOOLEAN".to_string(),
			ColumnType::Date => "DATE".to_string(),
			ColumnType::DateTime | ColumnType::Timestamp => "DATETIME".to_string(),
			ColumnType::Float | ColumnType::Double => "REAL".to_string(),
			ColumnType::Decimal(precision, scale) => format!("DECIMAL({},{})", precision, scale),
			ColumnType::Blob => "BLOB".to_string(),
		}
	}

	fn column_definition(&self, column: &SchemaColumn, inline_primary_key: bool) -> String {
		if column.auto_increment {
			// Only INTEGER PRIMARY KEY aliases the rowid
			return format!(
				"{} INTEGER PRIMARY KEY AUTOINCREMENT",
				self.quote_identifier(&column.name)
			);
		}
		let mut sql = generic_column_definition(
			self,
			column,
			&self.native_type(column.column_type),
			inline_primary_key,
		);
		if let ColumnType::Char(length) | ColumnType::Varchar(length) | ColumnType::NVarchar(length) =
			column.column_type
		{
			sql.push_str(&format!(
				" CHECK (length({}) <= {})",
				self.quote_identifier(&column.name),
				length
			));
		}
		sql
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn bool_literal(&self, value: bool) -> &'static str {
		if value { "1" } else { "0" }
	}

	fn string_literal(&self, value: &str) -> String {
		quote_with(value, '\'')
	}

	fn table_exists_sql(&self) -> String {
		"SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?".to_string()
	}

	fn drop_index_sql(&self, table: &str, index: &SchemaIndex) -> String {
		format!(
			"DROP INDEX {};",
			self.quote_identifier(&index.resolved_name(table))
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::migrations::schema::{Literal, SchemaTable};
	use rstest::rstest;

	#[rstest]
	#[case(ColumnType::BigInt, "INTEGER")]
	#[case(ColumnType::Int, "INTEGER")]
	#[case(ColumnType::SmallInt, "INTEGER")]
	#[case(ColumnType::Char(2), "TEXT")]
	#[case(ColumnType::Varchar(64), "TEXT")]
	#[case(ColumnType::NVarchar(255), "TEXT")]
	#[case(ColumnType::Text, "TEXT")]
	#[case(ColumnType::MediumText, "TEXT")]
	#[case(ColumnType::Uuid, "TEXT")]
	#[case(ColumnType::Bool, "BOOLEAN")]
	#[case(ColumnType::Date, "DATE")]
	#[case(ColumnType::DateTime, "DATETIME")]
	#[case(ColumnType::Timestamp, "DATETIME")]
	#[case(ColumnType::Float, "REAL")]
	#[case(ColumnType::Double, "REAL")]
	#[case(ColumnType::Decimal(10, 2), "DECIMAL(10,2)")]
	#[case(ColumnType::Blob, "BLOB")]
	fn test_native_type(#[case] column_type: ColumnType, #[case] expected: &str) {
		assert_eq!(SqliteDialect.native_type(column_type), expected);
	}

	#[rstest]
	#[case("users", "`users`")]
	#[case("odd`name", "`odd``name`")]
	#[case("with\"quote", "`with\"quote`")]
	fn test_quote_identifier(#[case] name: &str, #[case] expected: &str) {
		assert_eq!(SqliteDialect.quote_identifier(name), expected);
	}

	#[test]
	fn test_create_table() {
		let table = SchemaTable::new("users")
			.column(
				SchemaColumn::new("id", ColumnType::BigInt)
					.primary_key()
					.auto_increment(),
			)
			.column(SchemaColumn::new("name", ColumnType::NVarchar(255)))
			.column(SchemaColumn::new("active", ColumnType::Bool).default_value(Literal::Bool(true)))
			.column(SchemaColumn::new("note", ColumnType::Text).nullable());

		assert_eq!(
			SqliteDialect.create_table_sql(&table),
			"CREATE TABLE IF NOT EXISTS `users` (\n  `id` INTEGER PRIMARY KEY AUTOINCREMENT,\n  `name` TEXT NOT NULL CHECK (length(`name`) <= 255),\n  `active` BOOLEAN NOT NULL DEFAULT 1,\n  `note` TEXT\n);"
		);
	}

	#[test]
	fn test_create_table_composite_primary_key() {
		let table = SchemaTable::new("team_member")
			.column(SchemaColumn::new("team_id", ColumnType::BigInt).primary_key())
			.column(SchemaColumn::new("user_id", ColumnType::BigInt).primary_key());

		assert_eq!(
			SqliteDialect.create_table_sql(&table),
			"CREATE TABLE IF NOT EXISTS `team_member` (\n  `team_id` INTEGER NOT NULL,\n  `user_id` INTEGER NOT NULL,\n  PRIMARY KEY (`team_id`, `user_id`)\n);"
		);
	}

	#[test]
	fn test_index_statements() {
		let index = SchemaIndex::unique(["login"]);
		assert_eq!(
			SqliteDialect.create_index_sql("users", &index),
			"CREATE UNIQUE INDEX `UQE_users_login` ON `users` (`login`);"
		);
		assert_eq!(
			SqliteDialect.drop_index_sql("users", &index),
			"DROP INDEX `UQE_users_login`;"
		);
	}

	#[test]
	fn test_rename_and_drop() {
		assert_eq!(
			SqliteDialect.rename_table_sql("users", "users_tmp_qwerty"),
			"ALTER TABLE `users` RENAME TO `users_tmp_qwerty`;"
		);
		assert_eq!(
			SqliteDialect.drop_table_sql("users_tmp_qwerty"),
			"DROP TABLE `users_tmp_qwerty`;"
		);
	}

	#[rstest]
	#[case(Literal::Null, "NULL")]
	#[case(Literal::Bool(false), "0")]
	#[case(Literal::Int(-3), "-3")]
	#[case(Literal::text("it's"), "'it''s'")]
	#[case(Literal::CurrentTimestamp, "CURRENT_TIMESTAMP")]
	#[case(Literal::raw("lower('X')"), "lower('X')")]
	fn test_literals(#[case] literal: Literal, #[case] expected: &str) {
		assert_eq!(SqliteDialect.literal_sql(&literal), expected);
	}
}
