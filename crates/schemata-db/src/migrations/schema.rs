//! Backend-independent schema model
//!
//! Tables, columns and indices are plain values. They are built once by the code
//! defining a migration and never mutated after registration. Column and index
//! order is significant: it is the DDL order and the index key order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{MigrationError, Result};

/// Logical column type
///
/// Carries no backend representation; a [`Dialect`](super::Dialect) resolves it
/// to native DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "args")]
pub enum ColumnType {
	BigInt,
	Int,
	SmallInt,
	Char(u32),
	Varchar(u32),
	NVarchar(u32),
	Text,
	MediumText,
	Uuid,
	Bool,
	Date,
	DateTime,
	Timestamp,
	Float,
	Double,
	Decimal(u8, u8),
	Blob,
}

impl ColumnType {
	pub fn is_integer(&self) -> bool {
		matches!(self, ColumnType::BigInt | ColumnType::Int | ColumnType::SmallInt)
	}
}

/// Backend-independent SQL literal used for column defaults and copy mappings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Literal {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	CurrentTimestamp,
	/// Emitted verbatim
	Raw(String),
}

impl Literal {
	pub fn text(value: impl Into<String>) -> Self {
		Literal::Text(value.into())
	}

	pub fn raw(sql: impl Into<String>) -> Self {
		Literal::Raw(sql.into())
	}
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaColumn {
	pub name: String,
	pub column_type: ColumnType,
	#[serde(default)]
	pub primary_key: bool,
	#[serde(default)]
	pub auto_increment: bool,
	#[serde(default)]
	pub nullable: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Literal>,
}

impl SchemaColumn {
	/// New NOT NULL column without a default
	pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
		Self {
			name: name.into(),
			column_type,
			primary_key: false,
			auto_increment: false,
			nullable: false,
			default: None,
		}
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}

	pub fn auto_increment(mut self) -> Self {
		self.auto_increment = true;
		self
	}

	pub fn nullable(mut self) -> Self {
		self.nullable = true;
		self
	}

	pub fn default_value(mut self, value: Literal) -> Self {
		self.default = Some(value);
		self
	}

	/// Whether rows can be inserted without naming this column
	pub fn can_be_omitted(&self) -> bool {
		self.nullable || self.default.is_some() || self.auto_increment
	}
}

/// Index definition
///
/// Without an explicit name, the name is derived from the table and the column
/// list, see [`SchemaIndex::resolved_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIndex {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub columns: Vec<String>,
	#[serde(default)]
	pub unique: bool,
}

impl SchemaIndex {
	pub fn new<I, S>(columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: None,
			columns: columns.into_iter().map(Into::into).collect(),
			unique: false,
		}
	}

	pub fn unique<I, S>(columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			unique: true,
			..Self::new(columns)
		}
	}

	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Name the index has inside `table`
	///
	/// Explicit names that already carry the `IDX_`/`UQE_` prefix are kept as is;
	/// otherwise the name (or the joined column list) is prefixed with the kind and
	/// the table name.
	///
	/// # Examples
	///
	/// ```
	/// use schemata_db::migrations::SchemaIndex;
	///
	/// assert_eq!(SchemaIndex::new(["org_id", "login"]).resolved_name("user"), "IDX_user_org_id_login");
	/// assert_eq!(SchemaIndex::unique(["email"]).resolved_name("user"), "UQE_user_email");
	/// assert_eq!(SchemaIndex::new(["email"]).named("by_mail").resolved_name("user"), "IDX_user_by_mail");
	/// assert_eq!(SchemaIndex::new(["email"]).named("IDX_custom").resolved_name("user"), "IDX_custom");
	/// ```
	pub fn resolved_name(&self, table: &str) -> String {
		let base = match &self.name {
			Some(name) if !name.is_empty() => name.clone(),
			_ => self.columns.join("_"),
		};
		if base.starts_with("IDX_") || base.starts_with("UQE_") {
			return base;
		}
		let prefix = if self.unique { "UQE" } else { "IDX" };
		format!("{}_{}_{}", prefix, table, base)
	}

	/// Copy of this index with its name fixed for `table`
	pub fn resolve(&self, table: &str) -> Self {
		Self {
			name: Some(self.resolved_name(table)),
			..self.clone()
		}
	}
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaTable {
	pub name: String,
	pub columns: Vec<SchemaColumn>,
	#[serde(default)]
	pub indices: Vec<SchemaIndex>,
}

impl SchemaTable {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			columns: Vec::new(),
			indices: Vec::new(),
		}
	}

	pub fn column(mut self, column: SchemaColumn) -> Self {
		self.columns.push(column);
		self
	}

	pub fn index(mut self, index: SchemaIndex) -> Self {
		self.indices.push(index);
		self
	}

	/// Same table under another name, indices included
	pub fn renamed(&self, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..self.clone()
		}
	}

	pub fn get_column(&self, name: &str) -> Option<&SchemaColumn> {
		self.columns.iter().find(|c| c.name == name)
	}

	pub fn primary_key_columns(&self) -> Vec<&SchemaColumn> {
		self.columns.iter().filter(|c| c.primary_key).collect()
	}

	pub fn auto_increment_column(&self) -> Option<&SchemaColumn> {
		self.columns.iter().find(|c| c.auto_increment)
	}

	/// Check the structural invariants of the table
	///
	/// - the table has a name and at least one column
	/// - column names are unique
	/// - at most one auto-increment column, and it is the sole primary key column
	/// - index columns exist, and resolved index names are unique
	pub fn validate(&self) -> Result<()> {
		if self.name.is_empty() {
			return Err(MigrationError::InvalidSchema(
				"table name must not be empty".to_string(),
			));
		}
		if self.columns.is_empty() {
			return Err(MigrationError::InvalidSchema(format!(
				"table '{}' has no columns",
				self.name
			)));
		}

		let mut seen = HashSet::new();
		for column in &self.columns {
			if !seen.insert(column.name.as_str()) {
				return Err(MigrationError::InvalidSchema(format!(
					"duplicate column '{}' in table '{}'",
					column.name, self.name
				)));
			}
		}

		let auto_increment: Vec<_> = self.columns.iter().filter(|c| c.auto_increment).collect();
		if auto_increment.len() > 1 {
			return Err(MigrationError::InvalidSchema(format!(
				"table '{}' has more than one auto-increment column",
				self.name
			)));
		}
		// SQLite only auto-increments an `INTEGER PRIMARY KEY`; the rule holds for every dialect
		if let Some(column) = auto_increment.first() {
			if !column.primary_key || self.primary_key_columns().len() != 1 {
				return Err(MigrationError::InvalidSchema(format!(
					"auto-increment column '{}' in table '{}' must be the only primary key column",
					column.name, self.name
				)));
			}
			if !column.column_type.is_integer() {
				return Err(MigrationError::InvalidSchema(format!(
					"auto-increment column '{}' in table '{}' must have an integer type",
					column.name, self.name
				)));
			}
		}

		let mut index_names = HashSet::new();
		for index in &self.indices {
			self.validate_index(index)?;
			let name = index.resolved_name(&self.name);
			if !index_names.insert(name.clone()) {
				return Err(MigrationError::InvalidSchema(format!(
					"duplicate index name '{}' in table '{}'",
					name, self.name
				)));
			}
		}

		Ok(())
	}

	pub(crate) fn validate_index(&self, index: &SchemaIndex) -> Result<()> {
		if index.columns.is_empty() {
			return Err(MigrationError::InvalidSchema(format!(
				"index '{}' has no columns",
				index.resolved_name(&self.name)
			)));
		}
		for column in &index.columns {
			if self.get_column(column).is_none() {
				return Err(MigrationError::InvalidSchema(format!(
					"index '{}' references unknown column '{}' of table '{}'",
					index.resolved_name(&self.name),
					column,
					self.name
				)));
			}
		}
		Ok(())
	}
}
