//! Error taxonomy for a generation run.
//!
//! Every variant is fatal: a run that produces one of these writes nothing.

use std::fmt;

use dpgen_annotations::AnnotationError;
use thiserror::Error;

use crate::source::SourceFile;

/// Coarse classification of a fatal error, reported in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Input text does not follow the annotation grammar.
	Parse,
	/// Well-formed input refers to something that does not exist.
	Schema,
	/// An ID-space invariant is violated.
	Allocation,
	/// A file could not be read or written.
	Io,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Parse => "parse",
			Self::Schema => "schema",
			Self::Allocation => "allocation",
			Self::Io => "io",
		})
	}
}

/// Fatal generation error.
#[derive(Debug, Error)]
pub enum Error {
	/// The extractor rejected a file.
	#[error("{file}: {source}")]
	Annotation { file: String, source: AnnotationError },

	/// A fixed-format input (module table) is malformed.
	#[error("{file}: {message}")]
	Parse { file: String, message: String },

	#[error("{file}: {source}")]
	Schema { file: String, source: SchemaError },

	#[error("{file}: {source}")]
	Allocation { file: String, source: AllocationError },

	#[error("{path}: {source}")]
	Io { path: String, source: std::io::Error },
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Annotation { source, .. } if source.is_schema() => ErrorKind::Schema,
			Self::Annotation { .. } | Self::Parse { .. } => ErrorKind::Parse,
			Self::Schema { .. } => ErrorKind::Schema,
			Self::Allocation { .. } => ErrorKind::Allocation,
			Self::Io { .. } => ErrorKind::Io,
		}
	}

	pub(crate) fn annotation(file: &SourceFile, source: AnnotationError) -> Self {
		Self::Annotation {
			file: file.name(),
			source,
		}
	}

	pub(crate) fn parse(file: &SourceFile, message: impl Into<String>) -> Self {
		Self::Parse {
			file: file.name(),
			message: message.into(),
		}
	}

	pub(crate) fn schema(file: &SourceFile, source: SchemaError) -> Self {
		Self::Schema { file: file.name(), source }
	}

	pub(crate) fn allocation(file: impl Into<String>, source: AllocationError) -> Self {
		Self::Allocation {
			file: file.into(),
			source,
		}
	}

	/// Wraps an I/O error with the path it occurred on.
	pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
		Self::Io {
			path: path.display().to_string(),
			source,
		}
	}
}

/// Structurally valid input that references something unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	#[error("line {line}: unknown module '{symbol}'")]
	UnknownModule { symbol: String, line: usize },

	#[error("no module with ID {id:#04x} owns '{symbol}'")]
	UnknownModuleId { id: u8, symbol: String },

	#[error("line {line}: unknown referenced type '{ty}' for member '{member}'")]
	UnknownType { ty: String, member: String, line: usize },

	#[error("line {line}: type '{ty}' of member '{member}' references itself")]
	RecursiveType { ty: String, member: String, line: usize },

	#[error("root type '{ty}' is not defined")]
	MissingRootType { ty: String },

	#[error("module ID shift is {shift} but the layout reserves {index_bits} index bits")]
	ShiftMismatch { shift: u32, index_bits: u8 },
}

/// Violated ID-space invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
	#[error(
		"duplicate index {index} in module {module}: '{first}' and '{second}' both resolve to {composite:#06x}"
	)]
	DuplicateIndex {
		module: String,
		index: u32,
		first: String,
		second: String,
		composite: u16,
	},

	#[error(
		"module {module} assigned {blocks} block(s) of {capacity} but member '{symbol}' requires index {index} beyond capacity"
	)]
	BlockOverflow {
		module: String,
		blocks: usize,
		capacity: u32,
		symbol: String,
		index: u32,
	},

	#[error("root member '{symbol}' index {index} exceeds the root capacity of {capacity}")]
	RootOverflow { symbol: String, index: u32, capacity: u32 },

	#[error("composite ID {composite:#06x} assigned to both '{first}' and '{second}'")]
	CompositeCollision { composite: u16, first: String, second: String },

	#[error("module '{symbol}' ID {id:#04x} does not fit in {bits} module ID bits")]
	ModuleIdOutOfRange { symbol: String, id: u32, bits: u8 },

	#[error("module symbol '{symbol}' defined twice")]
	DuplicateModule { symbol: String },

	#[error("module ID {id:#04x} assigned to both '{first}' and '{second}'")]
	DuplicateModuleId { id: u8, first: String, second: String },

	#[error("constant '{symbol}' code {code} exceeds the module capacity of {capacity}")]
	CodeOutOfRange { symbol: String, code: u32, capacity: u32 },

	#[error("{table} value {value:#06x} shared by '{first}' and '{second}'")]
	DuplicateValue {
		table: &'static str,
		value: u16,
		first: String,
		second: String,
	},
}
