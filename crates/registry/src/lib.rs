//! ID assignment and validation for DataPool parameters and constants.
//!
//! A run parses the module table once ([`ModuleTable::parse`]), builds the
//! parameter registry from the DataPool definition ([`build_datapool`]) and
//! projects it, together with every error and event definition, into the
//! constant database ([`build_constant_db`]). Any [`Error`] aborts the run;
//! [`Warning`]s are collected and returned.
//!
//! Composite IDs are 16 bits, split by [`IdLayout`] between a module ID and
//! an index local to one block of that module.

mod constants;
mod error;
mod layout;
mod modules;
mod params;
mod source;
mod warning;

pub use constants::{
	ConstantDatabase, ConstantDbBuilder, ConstantEntry, ConstantKind, ConstantOptions, DuplicateValue,
	DuplicateValuePolicy, build_constant_db,
};
pub use error::{AllocationError, Error, ErrorKind, SchemaError};
pub use layout::{ID_BITS, IdLayout};
pub use modules::{DEFAULT_SHIFT_SYMBOL, MODULE_SYMBOL_PREFIX, ModuleEntry, ModuleTable};
pub use params::{
	DataPool, DataPoolOptions, ParameterEntry, ParameterRegistry, ParameterTable, build_datapool,
};
pub use source::SourceFile;
pub use warning::Warning;
