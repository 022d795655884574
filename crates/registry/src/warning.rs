use std::fmt;

/// Recoverable condition noticed during a run. Warnings are reported but do
/// not stop generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
	/// A parameter or constant has no `@brief`; an empty description is used.
	MissingBrief { file: String, symbol: String },
	/// A documented member carries neither `@dp` nor `@dp_module` and was skipped.
	MissingDirective { file: String, symbol: String, line: usize },
	/// A struct type is defined more than once; the first definition is used.
	DuplicateStruct { file: String, name: String, first: String },
	/// Several constants of one table share a value.
	DuplicateValue {
		table: &'static str,
		value: u16,
		symbols: Vec<String>,
	},
}

impl fmt::Display for Warning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingBrief { file, symbol } => {
				write!(f, "{file}: '{symbol}' has no @brief, using an empty description")
			}
			Self::MissingDirective { file, symbol, line } => {
				write!(f, "{file}:{line}: declaration '{symbol}' missing DataPool directive, skipped")
			}
			Self::DuplicateStruct { file, name, first } => {
				write!(f, "{file}: struct '{name}' already defined in {first}, ignoring this definition")
			}
			Self::DuplicateValue { table, value, symbols } => {
				write!(f, "{table}: value {value:#06x} shared by {}", symbols.join(", "))
			}
		}
	}
}
