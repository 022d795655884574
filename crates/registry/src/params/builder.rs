use dpgen_annotations::{Declaration, StructDef, struct_bodies};
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, trace};

use super::validate::ScopeValidator;
use super::{DataPoolOptions, ParameterEntry};
use crate::error::{Error, SchemaError};
use crate::modules::ModuleTable;
use crate::source::SourceFile;
use crate::warning::Warning;

/// A struct definition and the file it came from.
pub(crate) struct TypeDef<'a> {
	pub def: StructDef,
	pub file: &'a SourceFile,
}

/// Struct definitions of every input file, addressable by type name or tag.
pub(crate) struct TypeIndex<'a> {
	defs: IndexMap<String, TypeDef<'a>>,
	tags: HashMap<String, String>,
}

impl<'a> TypeIndex<'a> {
	pub fn collect(
		files: impl IntoIterator<Item = &'a SourceFile>,
		warnings: &mut Vec<Warning>,
	) -> Result<Self, Error> {
		let mut index = Self {
			defs: IndexMap::new(),
			tags: HashMap::default(),
		};

		for file in files {
			for def in struct_bodies(&file.text).map_err(|e| Error::annotation(file, e))? {
				if let Some(first) = index.defs.get(&def.name) {
					warnings.push(Warning::DuplicateStruct {
						file: file.name(),
						name: def.name.clone(),
						first: first.file.name(),
					});
					continue;
				}
				if let Some(tag) = &def.tag {
					index.tags.entry(tag.clone()).or_insert_with(|| def.name.clone());
				}
				index.defs.insert(def.name.clone(), TypeDef { def, file });
			}
		}

		Ok(index)
	}

	/// Looks up a member's type, accepting `Name`, `Tag` and `struct Tag`.
	pub fn get(&self, ty: &str) -> Option<&TypeDef<'a>> {
		let ty = ty.strip_prefix("struct ").unwrap_or(ty).trim();
		self.defs
			.get(ty)
			.or_else(|| self.tags.get(ty).and_then(|name| self.defs.get(name)))
	}
}

/// Index space a struct body is walked in.
pub(crate) struct Scope<'s> {
	/// Module name for diagnostics.
	pub module: &'s str,
	/// Symbol prefix of every member, e.g. `DP.EPS`.
	pub prefix: String,
	/// Module IDs of the blocks the scope may allocate from.
	pub blocks: &'s [u8],
	pub is_root: bool,
}

#[derive(Default)]
pub(crate) struct ScopeOutput {
	pub entries: Vec<ParameterEntry>,
	pub warnings: Vec<Warning>,
}

/// Walks one struct body, descending into `@dp_module` members.
///
/// `stack` holds the type names currently being walked and is used to reject
/// self-referencing types.
pub(crate) fn build_scope(
	types: &TypeIndex<'_>,
	modules: &ModuleTable,
	options: &DataPoolOptions,
	ty: &TypeDef<'_>,
	scope: Scope<'_>,
	stack: &mut Vec<String>,
) -> Result<ScopeOutput, Error> {
	let file = ty.file;
	let members = ty.def.members().map_err(|e| Error::annotation(file, e))?;
	let mut validator = ScopeValidator::new(
		scope.module,
		scope.blocks,
		scope.is_root,
		options.check_duplicate_index,
		modules.layout(),
	);
	let mut output = ScopeOutput::default();

	stack.push(ty.def.name.clone());
	for member in &members {
		let symbol = format!("{}.{}", scope.prefix, member.symbol);

		if let Some(reference) = &member.doc.dp_module {
			let nested = build_module_member(types, modules, options, file, member, reference, symbol, stack)?;
			output.entries.extend(nested.entries);
			output.warnings.extend(nested.warnings);
		} else if let Some(index) = member.doc.dp {
			let slot = validator
				.allocate(&symbol, index)
				.map_err(|e| Error::allocation(file.name(), e))?;
			let brief = member.doc.brief.clone().unwrap_or_else(|| {
				output.warnings.push(Warning::MissingBrief {
					file: file.name(),
					symbol: symbol.clone(),
				});
				String::new()
			});
			trace!(%symbol, id = slot.composite_id, "parameter");
			output.entries.push(ParameterEntry {
				symbol,
				module_id: slot.module_id,
				local_index: slot.local_index,
				composite_id: slot.composite_id,
				data_type: member.ty.clone(),
				brief,
				array: member.array.clone(),
			});
		} else {
			output.warnings.push(Warning::MissingDirective {
				file: file.name(),
				symbol,
				line: member.line,
			});
		}
	}
	stack.pop();

	debug!(
		ty = %ty.def.name,
		module = scope.module,
		parameters = output.entries.len(),
		"walked scope"
	);
	Ok(output)
}

#[allow(clippy::too_many_arguments)]
fn build_module_member(
	types: &TypeIndex<'_>,
	modules: &ModuleTable,
	options: &DataPoolOptions,
	file: &SourceFile,
	member: &Declaration,
	reference: &str,
	prefix: String,
	stack: &mut Vec<String>,
) -> Result<ScopeOutput, Error> {
	let module = modules.resolve(reference).ok_or_else(|| {
		Error::schema(
			file,
			SchemaError::UnknownModule {
				symbol: reference.to_string(),
				line: member.line,
			},
		)
	})?;
	let nested = types.get(&member.ty).ok_or_else(|| {
		Error::schema(
			file,
			SchemaError::UnknownType {
				ty: member.ty.clone(),
				member: member.symbol.clone(),
				line: member.line,
			},
		)
	})?;
	if stack.contains(&nested.def.name) {
		return Err(Error::schema(
			file,
			SchemaError::RecursiveType {
				ty: member.ty.clone(),
				member: member.symbol.clone(),
				line: member.line,
			},
		));
	}

	let blocks = modules.blocks(&module.module_name);
	let scope = Scope {
		module: &module.module_name,
		prefix,
		blocks: &blocks,
		is_root: false,
	};
	build_scope(types, modules, options, nested, scope, stack)
}
