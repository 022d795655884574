//! JSON renderings of the persisted parameter table and the constant
//! database.

use dpgen_registry::{ConstantDatabase, ParameterTable};
use serde::Serialize;

pub const PARAMETER_TABLE_FILE: &str = "DataPool_generated.json";
pub const CONST_DB_FILE: &str = "const_db.json";

fn pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
	let mut text = serde_json::to_string_pretty(value)?;
	text.push('\n');
	Ok(text)
}

/// Renders `DataPool_generated.json`: `{ "version", "source", "parameters" }`
/// with rows in registry order.
pub fn render_parameter_table(table: &ParameterTable) -> Result<String, serde_json::Error> {
	pretty(table)
}

pub fn parse_parameter_table(text: &str) -> Result<ParameterTable, serde_json::Error> {
	serde_json::from_str(text)
}

/// Renders `const_db.json`: `{ "modules", "errors", "events", "datapool" }`.
pub fn render_constant_db(db: &ConstantDatabase) -> Result<String, serde_json::Error> {
	pretty(db)
}

pub fn parse_constant_db(text: &str) -> Result<ConstantDatabase, serde_json::Error> {
	serde_json::from_str(text)
}
