//! Table replace
//!
//! Rebuilding a table under a new schema is expressed as primitive steps so that
//! each one is logged, and a rerun after a failure resumes at the failed one:
//!
//! 1. `drop index <idx> - v<v-1>` for every index of the old table
//! 2. `rename table <old> to <new>_tmp_qwerty - v<v-1>`
//! 3. `create <new> v<v>`
//! 4. `create index <idx> - v<v>` for every index of the new table
//! 5. `copy <new> v<v-1> to v<v>`
//! 6. `drop <new>_tmp_qwerty`
//!
//! Indices are dropped first so the renamed table does not keep names the new
//! table needs; they are rebuilt on the empty new table before the copy.

use super::mapping::ColumnMapping;
use super::schema::SchemaTable;
use super::step::MigrationStep;
use super::{MigrationError, Result};

/// Appended to the new table's name to hold the old data during a replace
pub const TEMP_TABLE_SUFFIX: &str = "_tmp_qwerty";

/// Ordered sub-steps of one table replace
#[derive(Debug, Clone, PartialEq)]
pub struct TableReplacePlan {
	/// Identifies the replace as a whole in error reports
	pub name: String,
	pub table: String,
	pub version: u32,
	pub temp_table: String,
	pub steps: Vec<(String, MigrationStep)>,
}

impl TableReplacePlan {
	pub fn step_ids(&self) -> Vec<&str> {
		self.steps.iter().map(|(id, _)| id.as_str()).collect()
	}
}

/// Expand a table replace from `from` to `to` at `version` into primitive steps
///
/// `mapping` says how the new table's columns derive from the old one. Every new
/// column it leaves out must be nullable, have a default, or be auto-increment.
///
/// # Errors
///
/// `InvalidMigration` for version 0, for mappings naming columns the tables do
/// not have, or leaving a required column unfilled; `InvalidSchema` when either
/// table is invalid.
///
/// # Examples
///
/// ```
/// use schemata_db::migrations::{
///     ColumnMapping, ColumnType, SchemaColumn, SchemaIndex, SchemaTable, replace_table,
/// };
///
/// let v1 = SchemaTable::new("tag")
///     .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
///     .column(SchemaColumn::new("key", ColumnType::NVarchar(100)))
///     .index(SchemaIndex::unique(["key"]));
/// let v2 = SchemaTable::new("tag")
///     .column(SchemaColumn::new("id", ColumnType::BigInt).primary_key().auto_increment())
///     .column(SchemaColumn::new("key", ColumnType::NVarchar(100)))
///     .column(SchemaColumn::new("value", ColumnType::NVarchar(100)).nullable())
///     .index(SchemaIndex::unique(["key", "value"]));
///
/// let plan = replace_table(&v1, &v2, 2, ColumnMapping::identity(&v1, &v2)).unwrap();
/// assert_eq!(
///     plan.step_ids(),
///     [
///         "drop index UQE_tag_key - v1",
///         "rename table tag to tag_tmp_qwerty - v1",
///         "create tag v2",
///         "create index UQE_tag_key_value - v2",
///         "copy tag v1 to v2",
///         "drop tag_tmp_qwerty",
///     ]
/// );
/// ```
pub fn replace_table(
	from: &SchemaTable,
	to: &SchemaTable,
	version: u32,
	mapping: ColumnMapping,
) -> Result<TableReplacePlan> {
	if version == 0 {
		return Err(MigrationError::InvalidMigration(format!(
			"table replace of '{}' needs a version of at least 1",
			to.name
		)));
	}
	from.validate()?;
	to.validate()?;
	validate_mapping(from, to, &mapping)?;

	let previous = version - 1;
	let temp_table = format!("{}{}", to.name, TEMP_TABLE_SUFFIX);
	let mut steps = Vec::with_capacity(from.indices.len() + to.indices.len() + 4);

	for index in &from.indices {
		steps.push((
			format!("drop index {} - v{}", index.resolved_name(&from.name), previous),
			MigrationStep::drop_index(from.name.clone(), index.clone()),
		));
	}

	steps.push((
		format!("rename table {} to {} - v{}", from.name, temp_table, previous),
		MigrationStep::rename_table(from.name.clone(), temp_table.clone()),
	));

	steps.push((
		format!("create {} v{}", to.name, version),
		MigrationStep::create_table(to.clone()),
	));

	for index in &to.indices {
		steps.push((
			format!("create index {} - v{}", index.resolved_name(&to.name), version),
			MigrationStep::create_index(to.name.clone(), index.clone()),
		));
	}

	steps.push((
		format!("copy {} v{} to v{}", to.name, previous, version),
		MigrationStep::copy_data(temp_table.clone(), to.clone(), mapping),
	));

	steps.push((
		format!("drop {}", temp_table),
		MigrationStep::drop_table(temp_table.clone()),
	));

	Ok(TableReplacePlan {
		name: format!("replace {} v{} to v{}", to.name, previous, version),
		table: to.name.clone(),
		version,
		temp_table,
		steps,
	})
}

fn validate_mapping(from: &SchemaTable, to: &SchemaTable, mapping: &ColumnMapping) -> Result<()> {
	if mapping.is_empty() {
		return Err(MigrationError::InvalidMigration(format!(
			"table replace of '{}' maps no columns",
			to.name
		)));
	}
	for column in mapping.mapped_columns() {
		if to.get_column(column).is_none() {
			return Err(MigrationError::InvalidMigration(format!(
				"mapping targets unknown column '{}' of table '{}'",
				column, to.name
			)));
		}
	}
	for column in mapping.source_columns() {
		if from.get_column(column).is_none() {
			return Err(MigrationError::InvalidMigration(format!(
				"mapping reads unknown column '{}' of table '{}'",
				column, from.name
			)));
		}
	}
	for column in &to.columns {
		if !mapping.maps(&column.name) && !column.can_be_omitted() {
			return Err(MigrationError::InvalidMigration(format!(
				"column '{}' of table '{}' is NOT NULL without default and is not mapped",
				column.name, to.name
			)));
		}
	}
	Ok(())
}
