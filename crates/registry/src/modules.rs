//! Module ID table.
//!
//! Parsed from the generated kernel module ID header, where each module is a
//! `#define` preceded by a comment naming it:
//!
//! ```c
//! #define KERNEL_MOD_ID_SHIFT (10)
//!
//! /**
//!  * @brief Eps module (components group) ID.
//!  */
//! #define MOD_ID_EPS ((ModuleId)(0x22 << KERNEL_MOD_ID_SHIFT))
//! ```
//!
//! A module listed under several symbols owns one block of index space per
//! listing, in table order.

use std::sync::LazyLock;

use dpgen_annotations::{Define, TokenKind, defines, parse_int_literal, tokenize};
use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AllocationError, Error, SchemaError};
use crate::layout::IdLayout;
use crate::source::SourceFile;

#[cfg(test)]
mod tests;

/// Default name of the shift-width declaration.
pub const DEFAULT_SHIFT_SYMBOL: &str = "KERNEL_MOD_ID_SHIFT";

/// Prefix of module symbols, used when resolving bare module names.
pub const MODULE_SYMBOL_PREFIX: &str = "MOD_ID_";

static MODULE_COMMENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\S+)\s+module\s+\((\S+)\s+group\)").expect("module comment pattern"));

static MODULE_HEX_ID: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b0[xX]([0-9A-Fa-f]{2})\b").expect("module ID pattern"));

/// One module table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
	pub symbol: String,
	pub module_name: String,
	pub group_name: String,
	#[serde(rename = "id")]
	pub raw_id: u8,
	pub shifted_id: u16,
}

/// Module table of one run, keyed by symbol in table order.
#[derive(Debug, Clone)]
pub struct ModuleTable {
	layout: IdLayout,
	entries: IndexMap<String, ModuleEntry>,
	by_raw_id: HashMap<u8, usize>,
}

impl ModuleTable {
	/// Parses the module ID header.
	///
	/// The shift-width declaration named `shift_symbol` is mandatory and must
	/// agree with `layout`; every composite ID depends on it.
	pub fn parse(file: &SourceFile, layout: IdLayout, shift_symbol: &str) -> Result<Self, Error> {
		let defines = defines(&file.text).map_err(|e| Error::annotation(file, e))?;

		let shift_define = defines
			.iter()
			.find(|d| d.name == shift_symbol)
			.ok_or_else(|| Error::parse(file, format!("missing shift-width declaration '{shift_symbol}'")))?;
		let shift = first_integer(shift_define).ok_or_else(|| {
			Error::parse(
				file,
				format!("line {}: '{shift_symbol}' has no integer value", shift_define.line),
			)
		})?;
		if shift != u32::from(layout.index_bits()) {
			return Err(Error::schema(
				file,
				SchemaError::ShiftMismatch {
					shift,
					index_bits: layout.index_bits(),
				},
			));
		}

		let mut table = Self::empty(layout);
		for define in &defines {
			if define.name == shift_symbol {
				continue;
			}
			let Some(captures) = define.comment.as_deref().and_then(|c| MODULE_COMMENT.captures(c)) else {
				continue;
			};
			let raw = MODULE_HEX_ID
				.captures(&define.body)
				.and_then(|c| u32::from_str_radix(&c[1], 16).ok())
				.ok_or_else(|| {
					Error::parse(
						file,
						format!("line {}: module '{}' has no two-digit hex ID", define.line, define.name),
					)
				})?;

			let raw_id = checked_module_id(&define.name, raw, layout).map_err(|e| Error::allocation(file.name(), e))?;
			table
				.insert(ModuleEntry {
					symbol: define.name.clone(),
					module_name: captures[1].to_string(),
					group_name: captures[2].to_string(),
					raw_id,
					shifted_id: 0,
				})
				.map_err(|e| Error::allocation(file.name(), e))?;
		}

		debug!(file = %file.name(), modules = table.len(), shift, "parsed module table");
		Ok(table)
	}

	/// Creates a table with no modules.
	pub fn empty(layout: IdLayout) -> Self {
		Self {
			layout,
			entries: IndexMap::new(),
			by_raw_id: HashMap::default(),
		}
	}

	/// Adds a module, computing its shifted ID from the table's layout.
	pub fn insert(&mut self, mut entry: ModuleEntry) -> Result<(), AllocationError> {
		checked_module_id(&entry.symbol, u32::from(entry.raw_id), self.layout)?;
		if self.entries.contains_key(&entry.symbol) {
			return Err(AllocationError::DuplicateModule { symbol: entry.symbol });
		}
		if let Some(&idx) = self.by_raw_id.get(&entry.raw_id) {
			return Err(AllocationError::DuplicateModuleId {
				id: entry.raw_id,
				first: self.entries[idx].symbol.clone(),
				second: entry.symbol,
			});
		}

		entry.shifted_id = self.layout.shifted(entry.raw_id);
		trace!(symbol = %entry.symbol, id = entry.raw_id, "module");
		self.by_raw_id.insert(entry.raw_id, self.entries.len());
		self.entries.insert(entry.symbol.clone(), entry);
		Ok(())
	}

	pub fn layout(&self) -> IdLayout {
		self.layout
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in table order.
	pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
		self.entries.values()
	}

	pub fn by_symbol(&self, symbol: &str) -> Option<&ModuleEntry> {
		self.entries.get(symbol)
	}

	pub fn by_raw_id(&self, raw_id: u8) -> Option<&ModuleEntry> {
		self.by_raw_id.get(&raw_id).map(|&idx| &self.entries[idx])
	}

	/// Resolves a module reference: exact symbol, then `MOD_ID_<NAME>`, then
	/// module name ignoring case.
	pub fn resolve(&self, name: &str) -> Option<&ModuleEntry> {
		self.by_symbol(name)
			.or_else(|| self.by_symbol(&format!("{MODULE_SYMBOL_PREFIX}{}", name.to_ascii_uppercase())))
			.or_else(|| self.iter().find(|m| m.module_name.eq_ignore_ascii_case(name)))
	}

	/// Module IDs of every block owned by `module_name`, in table order.
	pub fn blocks(&self, module_name: &str) -> Vec<u8> {
		self.iter().filter(|m| m.module_name == module_name).map(|m| m.raw_id).collect()
	}
}

fn checked_module_id(symbol: &str, raw: u32, layout: IdLayout) -> Result<u8, AllocationError> {
	if raw > layout.max_module_id() {
		return Err(AllocationError::ModuleIdOutOfRange {
			symbol: symbol.to_string(),
			id: raw,
			bits: layout.module_id_bits(),
		});
	}
	Ok(raw as u8)
}

fn first_integer(define: &Define) -> Option<u32> {
	tokenize(&define.body).ok()?.into_iter().find_map(|t| match t.kind {
		TokenKind::Number(text) => parse_int_literal(&text),
		_ => None,
	})
}
