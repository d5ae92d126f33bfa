use pg_escape::{quote_identifier, quote_literal};

use super::{Dialect, SqlDialect, generic_column_definition};
use crate::migrations::mapping::ColumnMapping;
use crate::migrations::schema::{ColumnType, SchemaColumn, SchemaIndex, SchemaTable};

/// PostgreSQL renderer
///
/// Identifiers and string literals are escaped with `pg_escape`, which leaves
/// plain lower-case identifiers unquoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
	fn kind(&self) -> SqlDialect {
		SqlDialect::Postgres
	}

	fn quote_identifier(&self, name: &str) -> String {
		quote_identifier(name).into_owned()
	}

	fn native_type(&self, column_type: ColumnType) -> String {
		match column_type {
			ColumnType::BigInt => "BIGINT".to_string(),
			ColumnType::Int => "INTEGER".to_string(),
			ColumnType::SmallInt => "SMALLINT".to_string(),
			ColumnType::Char(length) => format!("CHAR({})", length),
			ColumnType::Varchar(length) | ColumnType::NVarchar(length) => {
				format!("VARCHAR({})", length)
			}
			ColumnType::Text | ColumnType::MediumText => "TEXT".to_string(),
			ColumnType::Uuid => "UUID".to_string(),
			ColumnType::Bool => "BOOLEAN".to_string(),
			ColumnType::Date => "DATE".to_string(),
			ColumnType::DateTime => "TIMESTAMP".to_string(),
			ColumnType::Timestamp => "TIMESTAMP WITH TIME ZONE".to_string(),
			ColumnType::Float => "REAL".to_string(),
			ColumnType::Double => "DOUBLE PRECISION".to_string(),
			ColumnType::Decimal(precision, scale) => format!("NUMERIC({},{})", precision, scale),
			ColumnType::Blob => "BYTEA".to_string(),
		}
	}

	fn column_definition(&self, column: &SchemaColumn, inline_primary_key: bool) -> String {
		let type_sql = if column.auto_increment {
			match column.column_type {
				ColumnType::BigInt => "BIGSERIAL".to_string(),
				ColumnType::SmallInt => "SMALLSERIAL".to_string(),
				_ => "SERIAL".to_string(),
			}
		} else {
			self.native_type(column.column_type)
		};
		generic_column_definition(self, column, &type_sql, inline_primary_key)
	}

	fn placeholder(&self, index: usize) -> String {
		format!("${}", index)
	}

	fn bool_literal(&self, value: bool) -> &'static str {
		if value { "TRUE" } else { "FALSE" }
	}

	fn string_literal(&self, value: &str) -> String {
		quote_literal(value)
	}

	fn table_exists_sql(&self) -> String {
		"SELECT table_name FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1"
			.to_string()
	}

	fn drop_index_sql(&self, table: &str, index: &SchemaIndex) -> String {
		format!(
			"DROP INDEX {};",
			self.quote_identifier(&index.resolved_name(table))
		)
	}

	/// Explicit ids copied into a SERIAL column leave its sequence behind; move it past
	/// the highest copied value.
	fn post_copy_sql(&self, target: &SchemaTable, mapping: &ColumnMapping) -> Option<String> {
		let column = target.auto_increment_column()?;
		if !mapping.maps(&column.name) {
			return None;
		}
		let table = self.quote_identifier(&target.name);
		let quoted_column = self.quote_identifier(&column.name);
		Some(format!(
			"SELECT setval(pg_get_serial_sequence({}, {}), COALESCE(MAX({}), 0) + 1, false) FROM {};",
			self.string_literal(&table),
			self.string_literal(&column.name),
			quoted_column,
			table
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::migrations::schema::Literal;
	use rstest::rstest;

	#[rstest]
	#[case(ColumnType::BigInt, "BIGINT")]
	#[case(ColumnType::Int, "INTEGER")]
	#[case(ColumnType::SmallInt, "SMALLINT")]
	#[case(ColumnType::Char(2), "CHAR(2)")]
	#[case(ColumnType::Varchar(64), "VARCHAR(64)")]
	#[case(ColumnType::NVarchar(255), "VARCHAR(255)")]
	#[case(ColumnType::Text, "TEXT")]
	#[case(ColumnType::MediumText, "TEXT")]
	#[case(ColumnType::Uuid, "UUID")]
	#[case(ColumnType::Bool, "BOOLEAN")]
	#[case(ColumnType::Date, "DATE")]
	#[case(ColumnType::DateTime, "TIMESTAMP")]
	#[case(ColumnType::Timestamp, "TIMESTAMP WITH TIME ZONE")]
	#[case(ColumnType::Float, "REAL")]
	#[case(ColumnType::Double, "DOUBLE PRECISION")]
	#[case(ColumnType::Decimal(10, 2), "NUMERIC(10,2)")]
	#[case(ColumnType::Blob, "BYTEA")]
	fn test_native_type(#[case] column_type: ColumnType, #[case] expected: &str) {
		assert_eq!(PostgresDialect.native_type(column_type), expected);
	}

	#[test]
	fn test_create_table_uses_serial() {
		let table = SchemaTable::new("users")
			.column(
				SchemaColumn::new("id", ColumnType::BigInt)
					.primary_key()
					.auto_increment(),
			)
			.column(SchemaColumn::new("login", ColumnType::NVarchar(255)))
			.column(SchemaColumn::new("is_admin", ColumnType::Bool).default_value(Literal::Bool(true)));

		assert_eq!(
			PostgresDialect.create_table_sql(&table),
			"CREATE TABLE IF NOT EXISTS users (\n  id BIGSERIAL PRIMARY KEY,\n  login VARCHAR(255) NOT NULL,\n  is_admin BOOLEAN NOT NULL DEFAULT TRUE\n);"
		);
	}

	#[test]
	fn test_placeholders_are_numbered() {
		assert_eq!(PostgresDialect.placeholder(1), "$1");
		assert_eq!(PostgresDialect.placeholder(6), "$6");
	}

	#[test]
	fn test_mixed_case_identifiers_are_quoted() {
		assert_eq!(PostgresDialect.quote_identifier("users"), "users");
		assert_eq!(
			PostgresDialect.quote_identifier("IDX_users_login"),
			"\"IDX_users_login\""
		);
	}

	#[test]
	fn test_text_literal_escaping() {
		assert_eq!(PostgresDialect.literal_sql(&Literal::text("it's")), "'it''s'");
	}

	#[test]
	fn test_post_copy_resets_sequence() {
		let table = SchemaTable::new("users")
			.column(
				SchemaColumn::new("id", ColumnType::BigInt)
					.primary_key()
					.auto_increment(),
			)
			.column(SchemaColumn::new("name", ColumnType::Text));
		let mapping = ColumnMapping::new().column("id", "id").column("name", "name");

		assert_eq!(
			PostgresDialect.post_copy_sql(&table, &mapping).as_deref(),
			Some(
				"SELECT setval(pg_get_serial_sequence('users', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM users;"
			)
		);

		let without_id = ColumnMapping::new().column("name", "name");
		assert!(PostgresDialect.post_copy_sql(&table, &without_id).is_none());
	}
}
