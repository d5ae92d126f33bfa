//! Column mappings for data copies

use serde::{Deserialize, Serialize};

use super::schema::{Literal, SchemaTable};

/// Where a destination column takes its value from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnSource {
	/// Copied from a column of the source table
	Column(String),
	/// Filled with a constant
	Literal(Literal),
	/// Left to the destination column's default
	Ignore,
}

/// Ordered destination column -> source assignments of a copy
///
/// Destination columns that are absent (or [`ColumnSource::Ignore`]d) are filled
/// from their declared default, or NULL when nullable.
///
/// # Examples
///
/// ```
/// use schemata_db::migrations::{ColumnMapping, ColumnSource, Literal};
///
/// let mapping = ColumnMapping::new()
///     .column("id", "id")
///     .column("login", "name")
///     .literal("is_admin", Literal::Bool(false));
///
/// assert_eq!(mapping.source_for("login"), Some(&ColumnSource::Column("name".to_string())));
/// assert_eq!(mapping.mapped_columns(), ["id", "login", "is_admin"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
	entries: Vec<(String, ColumnSource)>,
}

impl ColumnMapping {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every column of `to` that `from` also has, copied by name in `to`'s order
	pub fn identity(from: &SchemaTable, to: &SchemaTable) -> Self {
		to.columns
			.iter()
			.filter(|column| from.get_column(&column.name).is_some())
			.fold(Self::new(), |mapping, column| {
				mapping.column(column.name.clone(), column.name.clone())
			})
	}

	/// Copy `destination` from source column `source`
	pub fn column(self, destination: impl Into<String>, source: impl Into<String>) -> Self {
		self.with(destination.into(), ColumnSource::Column(source.into()))
	}

	pub fn literal(self, destination: impl Into<String>, value: Literal) -> Self {
		self.with(destination.into(), ColumnSource::Literal(value))
	}

	pub fn ignore(self, destination: impl Into<String>) -> Self {
		self.with(destination.into(), ColumnSource::Ignore)
	}

	/// Later assignments to the same destination replace earlier ones in place
	fn with(mut self, destination: String, source: ColumnSource) -> Self {
		match self.entries.iter_mut().find(|(name, _)| *name == destination) {
			Some(entry) => entry.1 = source,
			None => self.entries.push((destination, source)),
		}
		self
	}

	pub fn entries(&self) -> &[(String, ColumnSource)] {
		&self.entries
	}

	pub fn source_for(&self, destination: &str) -> Option<&ColumnSource> {
		self.entries
			.iter()
			.find(|(name, _)| name == destination)
			.map(|(_, source)| source)
	}

	/// Whether `destination` receives a value from the copy
	pub fn maps(&self, destination: &str) -> bool {
		matches!(
			self.source_for(destination),
			Some(ColumnSource::Column(_) | ColumnSource::Literal(_))
		)
	}

	/// Destination columns written by the copy, in order
	pub fn mapped_columns(&self) -> Vec<&str> {
		self.entries
			.iter()
			.filter(|(_, source)| !matches!(source, ColumnSource::Ignore))
			.map(|(name, _)| name.as_str())
			.collect()
	}

	/// Source table columns read by the copy
	pub fn source_columns(&self) -> Vec<&str> {
		self.entries
			.iter()
			.filter_map(|(_, source)| match source {
				ColumnSource::Column(name) => Some(name.as_str()),
				_ => None,
			})
			.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.mapped_columns().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::migrations::schema::{ColumnType, SchemaColumn};

	#[test]
	fn test_identity_follows_destination_order() {
		let from = SchemaTable::new("t")
			.column(SchemaColumn::new("b", ColumnType::Text))
			.column(SchemaColumn::new("a", ColumnType::Text))
			.column(SchemaColumn::new("gone", ColumnType::Text));
		let to = SchemaTable::new("t")
			.column(SchemaColumn::new("a", ColumnType::Text))
			.column(SchemaColumn::new("new", ColumnType::Text).nullable())
			.column(SchemaColumn::new("b", ColumnType::Text));

		let mapping = ColumnMapping::identity(&from, &to);
		assert_eq!(mapping.mapped_columns(), ["a", "b"]);
		assert_eq!(mapping.source_columns(), ["a", "b"]);
	}

	#[test]
	fn test_reassignment_replaces_in_place() {
		let mapping = ColumnMapping::new()
			.column("a", "a")
			.column("b", "b")
			.literal("a", Literal::Int(1));
		assert_eq!(mapping.mapped_columns(), ["a", "b"]);
		assert_eq!(mapping.source_for("a"), Some(&ColumnSource::Literal(Literal::Int(1))));
	}

	#[test]
	fn test_ignored_columns_are_not_mapped() {
		let mapping = ColumnMapping::new().column("a", "a").ignore("b");
		assert!(mapping.maps("a"));
		assert!(!mapping.maps("b"));
		assert!(!mapping.maps("c"));
		assert_eq!(mapping.mapped_columns(), ["a"]);
	}

	#[test]
	fn test_only_ignored_is_empty() {
		assert!(ColumnMapping::new().is_empty());
		assert!(ColumnMapping::new().ignore("a").is_empty());
		assert!(!ColumnMapping::new().literal("a", Literal::Null).is_empty());
	}
}
