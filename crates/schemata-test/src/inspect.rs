//! SQLite inspection helpers for assertions

use schemata_db::backends::{DatabaseConnection, QueryValue};
use schemata_db::migrations::MigrationLogEntry;

pub async fn table_exists(connection: &DatabaseConnection, table: &str) -> bool {
	let rows = connection
		.fetch_all(
			"SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
			vec![QueryValue::from(table)],
		)
		.await
		.expect("Failed to query sqlite_master");
	!rows.is_empty()
}

/// Names of the explicitly created indices on `table`, sorted
pub async fn index_names(connection: &DatabaseConnection, table: &str) -> Vec<String> {
	let rows = connection
		.fetch_all(
			"SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ? AND sql IS NOT NULL ORDER BY name",
			vec![QueryValue::from(table)],
		)
		.await
		.expect("Failed to query sqlite_master");
	rows.iter()
		.map(|row| row.get::<String>("name").expect("index name"))
		.collect()
}

pub async fn count_rows(connection: &DatabaseConnection, table: &str) -> i64 {
	let sql = format!("SELECT COUNT(*) AS n FROM \"{}\"", table.replace('"', "\"\""));
	let rows = connection
		.fetch_all(&sql, Vec::new())
		.await
		.expect("Failed to count rows");
	rows[0].get::<i64>("n").expect("row count")
}

/// Whole migration log in insertion order
pub async fn log_rows(connection: &DatabaseConnection) -> Vec<MigrationLogEntry> {
	schemata_db::migrations::MigrationLog::new(connection.clone(), connection.database_type().into())
		.entries()
		.await
		.expect("Failed to read migration log")
}
