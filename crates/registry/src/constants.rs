//! Unified constant database.
//!
//! Error codes and events are `#define`s binding a module's shifted ID and a
//! local code:
//!
//! ```c
//! /**
//!  * @brief The EPS did not reply in time.
//!  */
//! #define EPS_ERROR_UART_TIMEOUT ((ErrorCode)(MOD_ID_EPS | 3))
//! ```
//!
//! They are collected next to the module table and the DataPool parameters
//! into four tables sharing one row shape.

use dpgen_annotations::{Define, defines, parse_int_literal};
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AllocationError, Error, SchemaError};
use crate::modules::{ModuleEntry, ModuleTable};
use crate::params::ParameterTable;
use crate::source::SourceFile;
use crate::warning::Warning;


/// One row of the errors, events or datapool table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantEntry {
	pub symbol: String,
	/// Display name of the owning module.
	pub module: String,
	pub description: String,
	pub value: u16,
}

/// Handling of several constants of one table sharing a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateValuePolicy {
	/// Record and report the duplicate, keep going.
	#[default]
	Warn,
	/// Fail the build.
	Deny,
}

/// Kind of a constant definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
	Error,
	Event,
}

impl ConstantKind {
	/// Name of the table the kind's constants land in.
	pub fn table(self) -> &'static str {
		match self {
			Self::Error => "errors",
			Self::Event => "events",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantOptions {
	/// Cast marking an error code define.
	pub error_type: String,
	/// Cast marking an event define.
	pub event_type: String,
	/// Module name of datapool rows with module ID 0.
	pub root_module: String,
	pub duplicate_values: DuplicateValuePolicy,
}

impl Default for ConstantOptions {
	fn default() -> Self {
		Self {
			error_type: "ErrorCode".to_string(),
			event_type: "Event".to_string(),
			root_module: "DataPool".to_string(),
			duplicate_values: DuplicateValuePolicy::Warn,
		}
	}
}

impl ConstantOptions {
	fn cast(&self, kind: ConstantKind) -> &str {
		match kind {
			ConstantKind::Error => &self.error_type,
			ConstantKind::Event => &self.event_type,
		}
	}
}

/// Value shared by several constants of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateValue {
	pub table: &'static str,
	pub value: u16,
	pub symbols: Vec<String>,
}

/// The four decode tables of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDatabase {
	pub modules: Vec<ModuleEntry>,
	pub errors: Vec<ConstantEntry>,
	pub events: Vec<ConstantEntry>,
	pub datapool: Vec<ConstantEntry>,
	/// Duplicate values found while building; not persisted.
	#[serde(skip)]
	pub duplicates: Vec<DuplicateValue>,
}

impl ConstantDatabase {
	/// Names of the tables holding [`ConstantEntry`] rows.
	pub const TABLES: [&'static str; 3] = ["errors", "events", "datapool"];

	/// Rows of the `errors`, `events` or `datapool` table.
	pub fn table(&self, name: &str) -> Option<&[ConstantEntry]> {
		match name {
			"errors" => Some(&self.errors),
			"events" => Some(&self.events),
			"datapool" => Some(&self.datapool),
			_ => None,
		}
	}

	fn tables(&self) -> impl Iterator<Item = (&'static str, &[ConstantEntry])> {
		Self::TABLES.into_iter().filter_map(|name| Some((name, self.table(name)?)))
	}

	/// Every row with `value`, tagged with its table name.
	pub fn by_value(&self, value: u16) -> Vec<(&'static str, &ConstantEntry)> {
		self.tables()
			.flat_map(|(name, rows)| rows.iter().filter(move |r| r.value == value).map(move |r| (name, r)))
			.collect()
	}

	/// Every row owned by the module named `module`, ignoring case.
	pub fn by_module(&self, module: &str) -> Vec<(&'static str, &ConstantEntry)> {
		self.tables()
			.flat_map(|(name, rows)| {
				rows.iter()
					.filter(move |r| r.module.eq_ignore_ascii_case(module))
					.map(move |r| (name, r))
			})
			.collect()
	}

	pub fn by_symbol(&self, symbol: &str) -> Option<(&'static str, &ConstantEntry)> {
		self.tables()
			.find_map(|(name, rows)| rows.iter().find(|r| r.symbol == symbol).map(|r| (name, r)))
	}

	pub fn module(&self, symbol: &str) -> Option<&ModuleEntry> {
		self.modules.iter().find(|m| m.symbol == symbol)
	}
}

/// Incremental constant database build over one module table.
pub struct ConstantDbBuilder<'a> {
	modules: &'a ModuleTable,
	options: &'a ConstantOptions,
	errors: Vec<ConstantEntry>,
	events: Vec<ConstantEntry>,
	datapool: IndexMap<String, ConstantEntry>,
	/// File each constant was read from, for diagnostics.
	origins: HashMap<String, String>,
	warnings: Vec<Warning>,
}

impl<'a> ConstantDbBuilder<'a> {
	pub fn new(modules: &'a ModuleTable, options: &'a ConstantOptions) -> Self {
		Self {
			modules,
			options,
			errors: Vec::new(),
			events: Vec::new(),
			datapool: IndexMap::new(),
			origins: HashMap::default(),
			warnings: Vec::new(),
		}
	}

	/// Adds the constants defined in an error or event file. Defines of any
	/// other shape are skipped.
	pub fn add_file(&mut self, kind: ConstantKind, file: &SourceFile) -> Result<(), Error> {
		let (modules, options) = (self.modules, self.options);
		let cast = options.cast(kind);
		let capacity = modules.layout().capacity();
		let mut rows = Vec::new();

		for define in defines(&file.text).map_err(|e| Error::annotation(file, e))? {
			let Some((module_symbol, code)) = constant_body(&define.body, cast) else {
				continue;
			};
			let module = modules.by_symbol(module_symbol).ok_or_else(|| {
				Error::schema(
					file,
					SchemaError::UnknownModule {
						symbol: module_symbol.to_string(),
						line: define.line,
					},
				)
			})?;
			if code >= capacity {
				return Err(Error::allocation(
					file.name(),
					AllocationError::CodeOutOfRange {
						symbol: define.name.clone(),
						code,
						capacity,
					},
				));
			}

			let value = module.shifted_id | code as u16;
			trace!(symbol = %define.name, value, table = kind.table(), "constant");
			self.origins.insert(define.name.clone(), file.name());
			rows.push(ConstantEntry {
				description: self.description(file, &define),
				symbol: define.name,
				module: module.module_name.clone(),
				value,
			});
		}

		debug!(file = %file.name(), table = kind.table(), constants = rows.len(), "read constants");
		match kind {
			ConstantKind::Error => self.errors.extend(rows),
			ConstantKind::Event => self.events.extend(rows),
		}
		Ok(())
	}

	fn description(&mut self, file: &SourceFile, define: &Define) -> String {
		match define.doc.as_ref().and_then(|d| d.brief.clone()) {
			Some(brief) => brief,
			None => {
				self.warnings.push(Warning::MissingBrief {
					file: file.name(),
					symbol: define.name.clone(),
				});
				String::new()
			}
		}
	}

	/// Projects a persisted parameter table into the datapool table.
	///
	/// Rows are keyed by symbol: ingesting a table again replaces its rows
	/// instead of appending them.
	pub fn ingest_parameters(&mut self, table: &ParameterTable) -> Result<(), Error> {
		let layout = self.modules.layout();
		for param in &table.parameters {
			let id = layout.module_of(param.composite_id);
			let module = match self.modules.by_raw_id(id) {
				Some(module) => module.module_name.clone(),
				None if id == 0 => self.options.root_module.clone(),
				None => {
					return Err(Error::Schema {
						file: table.source.clone(),
						source: SchemaError::UnknownModuleId {
							id,
							symbol: param.symbol.clone(),
						},
					});
				}
			};
			self.origins.insert(param.symbol.clone(), table.source.clone());
			self.datapool.insert(
				param.symbol.clone(),
				ConstantEntry {
					symbol: param.symbol.clone(),
					module,
					description: param.brief.clone(),
					value: param.composite_id,
				},
			);
		}
		debug!(source = %table.source, rows = self.datapool.len(), "ingested parameter table");
		Ok(())
	}

	/// Finishes the build, checking each table for shared values.
	pub fn finish(mut self) -> Result<(ConstantDatabase, Vec<Warning>), Error> {
		let mut db = ConstantDatabase {
			modules: self.modules.iter().cloned().collect(),
			errors: self.errors,
			events: self.events,
			datapool: self.datapool.into_values().collect(),
			duplicates: Vec::new(),
		};

		let mut duplicates = Vec::new();
		for (name, rows) in db.tables() {
			duplicates.extend(find_duplicates(name, rows));
		}
		if self.options.duplicate_values == DuplicateValuePolicy::Deny
			&& let Some(dup) = duplicates.first()
		{
			let second = dup.symbols[1].clone();
			let file = self.origins.get(&second).cloned().unwrap_or_default();
			return Err(Error::allocation(
				file,
				AllocationError::DuplicateValue {
					table: dup.table,
					value: dup.value,
					first: dup.symbols[0].clone(),
					second,
				},
			));
		}

		self.warnings.extend(duplicates.iter().map(|d| Warning::DuplicateValue {
			table: d.table,
			value: d.value,
			symbols: d.symbols.clone(),
		}));
		db.duplicates = duplicates;
		Ok((db, self.warnings))
	}
}

/// Builds the database from every error and event file plus an optional
/// persisted parameter table.
pub fn build_constant_db(
	modules: &ModuleTable,
	error_files: &[SourceFile],
	event_files: &[SourceFile],
	parameters: Option<&ParameterTable>,
	options: &ConstantOptions,
) -> Result<(ConstantDatabase, Vec<Warning>), Error> {
	let mut builder = ConstantDbBuilder::new(modules, options);
	for file in error_files {
		builder.add_file(ConstantKind::Error, file)?;
	}
	for file in event_files {
		builder.add_file(ConstantKind::Event, file)?;
	}
	if let Some(table) = parameters {
		builder.ingest_parameters(table)?;
	}
	builder.finish()
}

/// Matches `((<cast>)(<MODULE> | <code>))`, inner parentheses optional.
fn constant_body<'b>(body: &'b str, cast: &str) -> Option<(&'b str, u32)> {
	let rest = body.trim().strip_prefix('(')?.trim_start().strip_prefix('(')?.trim_start();
	let rest = rest.strip_prefix(cast)?.trim_start().strip_prefix(')')?.trim();
	let rest = rest.strip_suffix(')')?.trim();
	let inner = rest
		.strip_prefix('(')
		.and_then(|r| r.strip_suffix(')'))
		.unwrap_or(rest);

	let (module, code) = inner.split_once('|')?;
	let module = module.trim();
	if module.is_empty() || !module.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return None;
	}
	Some((module, parse_int_literal(code.trim())?))
}

fn find_duplicates(table: &'static str, rows: &[ConstantEntry]) -> Vec<DuplicateValue> {
	let mut by_value: IndexMap<u16, Vec<String>> = IndexMap::new();
	for row in rows {
		by_value.entry(row.value).or_default().push(row.symbol.clone());
	}
	by_value
		.into_iter()
		.filter(|(_, symbols)| symbols.len() > 1)
		.map(|(value, symbols)| DuplicateValue { table, value, symbols })
		.collect()
}
