//! ID-space invariants checked while a registry is built.

use rustc_hash::FxHashMap as HashMap;

use super::ParameterEntry;
use crate::error::AllocationError;
use crate::layout::IdLayout;

/// Placement of one leaf inside the module's blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
	/// Module ID of the block the index falls in.
	pub module_id: u8,
	/// Index inside that block.
	pub local_index: u16,
	pub composite_id: u16,
}

/// Allocator and validator for one module scope.
///
/// Local indices are only unique per scope: distinct modules reuse small
/// indices that become distinct after the module ID shift.
pub(crate) struct ScopeValidator<'a> {
	module: &'a str,
	blocks: &'a [u8],
	is_root: bool,
	check_duplicates: bool,
	layout: IdLayout,
	seen: HashMap<u32, String>,
}

impl<'a> ScopeValidator<'a> {
	pub fn new(module: &'a str, blocks: &'a [u8], is_root: bool, check_duplicates: bool, layout: IdLayout) -> Self {
		Self {
			module,
			blocks,
			is_root,
			check_duplicates,
			layout,
			seen: HashMap::default(),
		}
	}

	/// Places `symbol` at `index`, failing if the index overflows the
	/// module's blocks or is already taken in this scope.
	pub fn allocate(&mut self, symbol: &str, index: u32) -> Result<Slot, AllocationError> {
		let capacity = self.layout.capacity();
		let block = (index / capacity) as usize;
		let Some(&module_id) = self.blocks.get(block) else {
			return Err(if self.is_root {
				AllocationError::RootOverflow {
					symbol: symbol.to_string(),
					index,
					capacity,
				}
			} else {
				AllocationError::BlockOverflow {
					module: self.module.to_string(),
					blocks: self.blocks.len(),
					capacity,
					symbol: symbol.to_string(),
					index,
				}
			});
		};

		let local_index = (index % capacity) as u16;
		let composite_id = self.layout.composite(module_id, local_index);

		if self.check_duplicates
			&& let Some(first) = self.seen.get(&index)
		{
			return Err(AllocationError::DuplicateIndex {
				module: self.module.to_string(),
				index,
				first: first.clone(),
				second: symbol.to_string(),
				composite: composite_id,
			});
		}
		self.seen.insert(index, symbol.to_string());

		Ok(Slot {
			module_id,
			local_index,
			composite_id,
		})
	}
}

/// Checks that no two entries of a finished registry share a composite ID.
///
/// Implied by the per-scope checks when every module is referenced once, but
/// two members referencing the same module, or per-scope checks disabled,
/// can still collide.
pub(crate) fn check_unique_composites(entries: &[ParameterEntry]) -> Result<(), AllocationError> {
	let mut seen: HashMap<u16, &str> = HashMap::default();
	for entry in entries {
		if let Some(first) = seen.insert(entry.composite_id, &entry.symbol) {
			return Err(AllocationError::CompositeCollision {
				composite: entry.composite_id,
				first: first.to_string(),
				second: entry.symbol.clone(),
			});
		}
	}
	Ok(())
}
