//! Bit layout of a 16-bit composite ID.
//!
//! ```text
//!  15            index_bits  index_bits-1        0
//! +------------------------+----------------------+
//! |       module ID        |     local index      |
//! +------------------------+----------------------+
//! ```

use serde::{Deserialize, Serialize};

/// Width of every composite ID.
pub const ID_BITS: u8 = 16;

/// Split of the composite ID between module ID and local index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdLayout {
	index_bits: u8,
	module_id_bits: u8,
}

impl Default for IdLayout {
	fn default() -> Self {
		Self {
			index_bits: 10,
			module_id_bits: 6,
		}
	}
}

impl IdLayout {
	/// Returns `None` unless both fields are non-zero and fill exactly
	/// [`ID_BITS`].
	pub fn new(index_bits: u8, module_id_bits: u8) -> Option<Self> {
		let valid = index_bits > 0 && module_id_bits > 0 && index_bits.checked_add(module_id_bits) == Some(ID_BITS);
		valid.then_some(Self {
			index_bits,
			module_id_bits,
		})
	}

	pub fn index_bits(self) -> u8 {
		self.index_bits
	}

	pub fn module_id_bits(self) -> u8 {
		self.module_id_bits
	}

	/// Local indices available in one block.
	pub fn capacity(self) -> u32 {
		1 << self.index_bits
	}

	/// Largest representable module ID.
	pub fn max_module_id(self) -> u32 {
		(1 << self.module_id_bits) - 1
	}

	/// Module ID shifted into position.
	pub fn shifted(self, module_id: u8) -> u16 {
		u16::from(module_id) << self.index_bits
	}

	/// Combines a block's module ID with an index inside that block.
	pub fn composite(self, module_id: u8, index: u16) -> u16 {
		debug_assert!(u32::from(index) < self.capacity());
		self.shifted(module_id) | index
	}

	/// Module ID part of a composite ID.
	pub fn module_of(self, composite: u16) -> u8 {
		(composite >> self.index_bits) as u8
	}

	/// Local index part of a composite ID.
	pub fn index_of(self, composite: u16) -> u16 {
		composite & ((1 << self.index_bits) - 1) as u16
	}
}
