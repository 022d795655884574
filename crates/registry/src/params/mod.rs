//! DataPool parameter registry.
//!
//! The root struct of the DataPool definition is walked member by member. A
//! member tagged `@dp <n>` is a leaf parameter at index `n` of the current
//! scope; a member tagged `@dp_module <name>` opens the nested struct of that
//! module's parameter block as a new scope.

mod builder;
mod validate;


use dpgen_annotations::{header_version, includes};
use serde::{Deserialize, Serialize};
use tracing::debug;

use self::builder::{Scope, TypeIndex};
use crate::error::{AllocationError, Error, SchemaError};
use crate::modules::ModuleTable;
use crate::source::SourceFile;
use crate::warning::Warning;

/// One leaf parameter with its assigned ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
	/// Dotted path from the root symbol, e.g. `DP.EPS.INITIALISED`.
	pub symbol: String,
	/// Module ID of the block holding the parameter; 0 at the root.
	pub module_id: u8,
	/// Index inside that block.
	pub local_index: u16,
	pub composite_id: u16,
	pub data_type: String,
	pub brief: String,
	/// Array length text for array members, e.g. `[EPS_MAX_UART_FRAME_LENGTH]`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub array: Option<String>,
}

/// Validated, ordered set of parameters.
///
/// Entries keep source declaration order and carry pairwise distinct
/// composite IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterRegistry {
	entries: Vec<ParameterEntry>,
}

impl ParameterRegistry {
	/// Wraps `entries`, checking composite ID uniqueness.
	pub fn new(entries: Vec<ParameterEntry>) -> Result<Self, AllocationError> {
		validate::check_unique_composites(&entries)?;
		Ok(Self { entries })
	}

	pub fn entries(&self) -> &[ParameterEntry] {
		&self.entries
	}

	pub fn iter(&self) -> std::slice::Iter<'_, ParameterEntry> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn by_composite(&self, composite_id: u16) -> Option<&ParameterEntry> {
		self.entries.iter().find(|e| e.composite_id == composite_id)
	}

	pub fn by_symbol(&self, symbol: &str) -> Option<&ParameterEntry> {
		self.entries.iter().find(|e| e.symbol == symbol)
	}

	/// Distinct data types in order of first appearance.
	pub fn data_types(&self) -> Vec<&str> {
		let mut types: Vec<&str> = Vec::new();
		for entry in &self.entries {
			if !types.contains(&entry.data_type.as_str()) {
				types.push(&entry.data_type);
			}
		}
		types
	}
}

impl<'a> IntoIterator for &'a ParameterRegistry {
	type Item = &'a ParameterEntry;
	type IntoIter = std::slice::Iter<'a, ParameterEntry>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Knobs of the parameter build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoolOptions {
	/// Type name of the root struct.
	pub root_type: String,
	/// Leading component of every parameter symbol; also the C global the
	/// dispatch code reads from.
	pub root_symbol: String,
	/// Reject two members of one scope sharing a local index.
	pub check_duplicate_index: bool,
}

impl Default for DataPoolOptions {
	fn default() -> Self {
		Self {
			root_type: "DataPool".to_string(),
			root_symbol: "DP".to_string(),
			check_duplicate_index: true,
		}
	}
}

/// Persisted form of a registry, re-loaded by the constant database build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTable {
	pub version: String,
	pub source: String,
	pub parameters: Vec<ParameterEntry>,
}

/// Result of a parameter build.
#[derive(Debug, Clone)]
pub struct DataPool {
	/// `@version` of the root definition file.
	pub version: String,
	/// File name of the root definition file.
	pub source: String,
	/// Quoted includes of the root definition file, in source order.
	pub includes: Vec<String>,
	pub registry: ParameterRegistry,
	pub warnings: Vec<Warning>,
}

impl DataPool {
	pub fn table(&self) -> ParameterTable {
		ParameterTable {
			version: self.version.clone(),
			source: self.source.clone(),
			parameters: self.registry.entries().to_vec(),
		}
	}
}

/// Builds and validates the parameter registry.
///
/// `root` holds the root struct; `included` are the files it includes, whose
/// structs back `@dp_module` members. When a struct is defined more than
/// once the first definition wins, searching `root` first.
pub fn build_datapool(
	root: &SourceFile,
	included: &[SourceFile],
	modules: &ModuleTable,
	options: &DataPoolOptions,
) -> Result<DataPool, Error> {
	let version = header_version(&root.text).map_err(|e| Error::annotation(root, e))?;
	let includes = includes(&root.text).map_err(|e| Error::annotation(root, e))?;

	let mut warnings = Vec::new();
	let types = TypeIndex::collect(std::iter::once(root).chain(included), &mut warnings)?;

	let root_def = types.get(&options.root_type).ok_or_else(|| {
		Error::schema(
			root,
			SchemaError::MissingRootType {
				ty: options.root_type.clone(),
			},
		)
	})?;

	let root_blocks = [0u8];
	let scope = Scope {
		module: &options.root_type,
		prefix: options.root_symbol.clone(),
		blocks: &root_blocks,
		is_root: true,
	};
	let mut stack = Vec::new();
	let output = builder::build_scope(&types, modules, options, root_def, scope, &mut stack)?;
	warnings.extend(output.warnings);

	let registry = ParameterRegistry::new(output.entries).map_err(|e| Error::allocation(root.name(), e))?;
	debug!(
		file = %root.name(),
		%version,
		parameters = registry.len(),
		warnings = warnings.len(),
		"built DataPool registry"
	);

	Ok(DataPool {
		version,
		source: root.file_name(),
		includes,
		registry,
		warnings,
	})
}
