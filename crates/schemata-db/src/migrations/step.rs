//! Migration steps

use serde::{Deserialize, Serialize};

use super::dialect::Dialect;
use super::mapping::ColumnMapping;
use super::schema::{SchemaIndex, SchemaTable};
use super::{MigrationError, Result};

/// One unit of schema change
///
/// A step renders to one or more statements through a [`Dialect`]; the migrator
/// executes them as a single unit and logs the outcome under the step's id.
///
/// # Examples
///
/// ```
/// use schemata_db::migrations::{MigrationStep, SchemaIndex, SqliteDialect};
///
/// let step = MigrationStep::create_index("users", SchemaIndex::unique(["login"]));
/// assert_eq!(
///     step.render(&SqliteDialect),
///     ["CREATE UNIQUE INDEX `UQE_users_login` ON `users` (`login`);"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationStep {
	/// Create the table only; its indices are separate steps
	CreateTable(SchemaTable),
	CreateIndex {
		table: String,
		index: SchemaIndex,
	},
	DropIndex {
		table: String,
		index: SchemaIndex,
	},
	RenameTable {
		old_name: String,
		new_name: String,
	},
	/// Fill `target` with the rows of table `source` projected through `mapping`
	CopyData {
		source: String,
		target: SchemaTable,
		mapping: ColumnMapping,
	},
	DropTable {
		name: String,
	},
}

impl MigrationStep {
	pub fn create_table(table: SchemaTable) -> Self {
		MigrationStep::CreateTable(table)
	}

	/// The index name is resolved against `table` here
	pub fn create_index(table: impl Into<String>, index: SchemaIndex) -> Self {
		let table = table.into();
		let index = index.resolve(&table);
		MigrationStep::CreateIndex { table, index }
	}

	pub fn drop_index(table: impl Into<String>, index: SchemaIndex) -> Self {
		let table = table.into();
		let index = index.resolve(&table);
		MigrationStep::DropIndex { table, index }
	}

	pub fn rename_table(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
		MigrationStep::RenameTable {
			old_name: old_name.into(),
			new_name: new_name.into(),
		}
	}

	pub fn copy_data(source: impl Into<String>, target: SchemaTable, mapping: ColumnMapping) -> Self {
		MigrationStep::CopyData {
			source: source.into(),
			target,
			mapping,
		}
	}

	pub fn drop_table(name: impl Into<String>) -> Self {
		MigrationStep::DropTable { name: name.into() }
	}

	/// Short operation name for logs
	pub fn kind(&self) -> &'static str {
		match self {
			MigrationStep::CreateTable(_) => "create table",
			MigrationStep::CreateIndex { .. } => "create index",
			MigrationStep::DropIndex { .. } => "drop index",
			MigrationStep::RenameTable { .. } => "rename table",
			MigrationStep::CopyData { .. } => "copy data",
			MigrationStep::DropTable { .. } => "drop table",
		}
	}

	/// Statements this step executes, in order
	pub fn render(&self, dialect: &dyn Dialect) -> Vec<String> {
		match self {
			MigrationStep::CreateTable(table) => vec![dialect.create_table_sql(table)],
			MigrationStep::CreateIndex { table, index } => {
				vec![dialect.create_index_sql(table, index)]
			}
			MigrationStep::DropIndex { table, index } => vec![dialect.drop_index_sql(table, index)],
			MigrationStep::RenameTable { old_name, new_name } => {
				vec![dialect.rename_table_sql(old_name, new_name)]
			}
			MigrationStep::CopyData {
				source,
				target,
				mapping,
			} => {
				let mut statements = vec![dialect.copy_data_sql(source, &target.name, mapping)];
				statements.extend(dialect.post_copy_sql(target, mapping));
				statements
			}
			MigrationStep::DropTable { name } => vec![dialect.drop_table_sql(name)],
		}
	}

	/// Rendered statements as one text, the form stored in the migration log
	pub fn sql(&self, dialect: &dyn Dialect) -> String {
		self.render(dialect).join("\n")
	}

	/// Registration-time checks that need no database
	pub fn validate(&self) -> Result<()> {
		match self {
			MigrationStep::CreateTable(table) => table.validate(),
			MigrationStep::CreateIndex { table, index } | MigrationStep::DropIndex { table, index } => {
				require_name("table", table)?;
				if index.columns.is_empty() {
					return Err(MigrationError::InvalidSchema(format!(
						"index '{}' has no columns",
						index.resolved_name(table)
					)));
				}
				Ok(())
			}
			MigrationStep::RenameTable { old_name, new_name } => {
				require_name("table", old_name)?;
				require_name("table", new_name)?;
				if old_name == new_name {
					return Err(MigrationError::InvalidMigration(format!(
						"cannot rename table '{}' to itself",
						old_name
					)));
				}
				Ok(())
			}
			MigrationStep::CopyData {
				source,
				target,
				mapping,
			} => {
				require_name("source table", source)?;
				target.validate()?;
				if mapping.is_empty() {
					return Err(MigrationError::InvalidMigration(format!(
						"copy from '{}' to '{}' maps no columns",
						source, target.name
					)));
				}
				for column in mapping.mapped_columns() {
					if target.get_column(column).is_none() {
						return Err(MigrationError::InvalidMigration(format!(
							"copy maps unknown column '{}' of table '{}'",
							column, target.name
						)));
					}
				}
				Ok(())
			}
			MigrationStep::DropTable { name } => require_name("table", name),
		}
	}
}

fn require_name(what: &str, name: &str) -> Result<()> {
	if name.trim().is_empty() {
		return Err(MigrationError::InvalidMigration(format!(
			"{} name must not be empty",
			what
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::migrations::dialect::{PostgresDialect, SqliteDialect};
	use crate::migrations::schema::{ColumnType, Literal, SchemaColumn};

	fn users() -> SchemaTable {
		SchemaTable::new("users")
			.column(
				SchemaColumn::new("id", ColumnType::BigInt)
					.primary_key()
					.auto_increment(),
			)
			.column(SchemaColumn::new("login", ColumnType::Text))
	}

	#[test]
	fn test_create_index_resolves_name() {
		let step = MigrationStep::create_index("users", SchemaIndex::new(["login"]));
		match step {
			MigrationStep::CreateIndex { index, .. } => {
				assert_eq!(index.name.as_deref(), Some("IDX_users_login"));
			}
			other => panic!("unexpected step {:?}", other),
		}
	}

	#[test]
	fn test_copy_renders_sequence_reset_on_postgres_only() {
		let step = MigrationStep::copy_data(
			"users_tmp_qwerty",
			users(),
			ColumnMapping::new().column("id", "id").column("login", "login"),
		);
		assert_eq!(step.render(&SqliteDialect).len(), 1);
		let statements = step.render(&PostgresDialect);
		assert_eq!(statements.len(), 2);
		assert!(statements[0].starts_with("INSERT INTO users (id, login) SELECT id, login FROM users_tmp_qwerty"));
		assert!(statements[1].starts_with("SELECT setval("));
	}

	#[test]
	fn test_sql_joins_statements() {
		let step = MigrationStep::drop_table("users_tmp_qwerty");
		assert_eq!(step.sql(&SqliteDialect), "DROP TABLE `users_tmp_qwerty`;");
	}

	#[test]
	fn test_copy_without_mapped_columns_is_invalid() {
		let step = MigrationStep::copy_data("a", users(), ColumnMapping::new().ignore("login"));
		let err = step.validate().unwrap_err();
		assert!(matches!(err, MigrationError::InvalidMigration(ref msg) if msg.contains("maps no columns")));
	}

	#[test]
	fn test_copy_to_unknown_column_is_invalid() {
		let step = MigrationStep::copy_data(
			"a",
			users(),
			ColumnMapping::new().literal("missing", Literal::Int(1)),
		);
		assert!(matches!(
			step.validate(),
			Err(MigrationError::InvalidMigration(_))
		));
	}

	#[test]
	fn test_rename_to_same_name_is_invalid() {
		assert!(MigrationStep::rename_table("a", "a").validate().is_err());
		assert!(MigrationStep::rename_table("a", "b").validate().is_ok());
	}

	#[test]
	fn test_empty_names_are_invalid() {
		assert!(MigrationStep::drop_table(" ").validate().is_err());
		assert!(
			MigrationStep::create_index("", SchemaIndex::new(["a"]))
				.validate()
				.is_err()
		);
	}

	#[test]
	fn test_kind() {
		assert_eq!(MigrationStep::create_table(users()).kind(), "create table");
		assert_eq!(MigrationStep::drop_table("t").kind(), "drop table");
	}
}
