use super::{Dialect, SqlDialect, generic_column_definition, quote_with};
use crate::migrations::schema::{ColumnType, SchemaColumn, SchemaIndex};

/// MySQL / MariaDB renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
	fn kind(&self) -> SqlDialect {
		SqlDialect::Mysql
	}

	fn quote_identifier(&self, name: &str) -> String {
		quote_with(name, '`')
	}

	fn native_type(&self, column_type: ColumnType) -> String {
		match column_type {
			ColumnType::BigInt => "BIGINT".to_string(),
			ColumnType::Int => "INT".to_string(),
			ColumnType::SmallInt => "SMALLINT".to_string(),
			ColumnType::Char(length) => format!("CHAR({})", length),
			ColumnType::Varchar(length) | ColumnType::NVarchar(length) => {
				format!("VARCHAR({})", length)
			}
			ColumnType::Text => "TEXT".to_string(),
			ColumnType::MediumText => "MEDIUMTEXT".to_string(),
			ColumnType::Uuid => "CHAR(36)".to_string(),
			ColumnType::Bool => "TINYINT(1)".to_string(),
			ColumnType::Date => "DATE".to_string(),
			ColumnType::DateTime => "DATETIME".to_string(),
			ColumnType::Timestamp => "TIMESTAMP".to_string(),
			ColumnType::Float => "FLOAT".to_string(),
			ColumnType::Double => "DOUBLE".to_string(),
			ColumnType::Decimal(precision, scale) => format!("DECIMAL({},{})", precision, scale),
			ColumnType::Blob => "LONGBLOB".to_string(),
		}
	}

	fn column_definition(&self, column: &SchemaColumn, inline_primary_key: bool) -> String {
		if column.auto_increment {
			return format!(
				"{} {} NOT NULL AUTO_INCREMENT PRIMARY KEY",
				self.quote_identifier(&column.name),
				self.native_type(column.column_type)
			);
		}
		generic_column_definition(
			self,
			column,
			&self.native_type(column.column_type),
			inline_primary_key,
		)
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn bool_literal(&self, value: bool) -> &'static str {
		if value { "1" } else { "0" }
	}

	fn string_literal(&self, value: &str) -> String {
		// Backslash is an escape character in MySQL string literals by default
		quote_with(&value.replace('\\', "\\\\"), '\'')
	}

	fn table_options(&self) -> Option<&'static str> {
		Some("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4")
	}

	fn table_exists_sql(&self) -> String {
		"SELECT table_name FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?"
			.to_string()
	}

	/// MySQL index names are scoped to their table
	fn drop_index_sql(&self, table: &str, index: &SchemaIndex) -> String {
		format!(
			"DROP INDEX {} ON {};",
			self.quote_identifier(&index.resolved_name(table)),
			self.quote_identifier(table)
		)
	}

	fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
		format!(
			"RENAME TABLE {} TO {};",
			self.quote_identifier(old_name),
			self.quote_identifier(new_name)
		)
	}
}
