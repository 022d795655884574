//! Error types for annotation extraction.

use thiserror::Error;

/// Errors raised while scanning an annotated definition file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
	/// A comment or quoted literal runs to the end of the input.
	#[error("line {line}: unterminated {what}")]
	Unterminated {
		/// `"comment"` or `"literal"`.
		what: &'static str,
		/// Line the construct started on.
		line: usize,
	},

	/// A directive carries a value of the wrong shape.
	#[error("line {line}: invalid @{tag} value '{value}'")]
	InvalidDirective { tag: &'static str, value: String, line: usize },

	/// A struct body has no closing brace.
	#[error("line {line}: unbalanced braces in struct '{name}'")]
	UnbalancedBraces { name: String, line: usize },

	/// A struct body expected to hold members has none.
	#[error("line {line}: no member declarations found in '{name}'")]
	NoDeclarations { name: String, line: usize },

	/// The header comment lacks the mandatory `@version` tag.
	#[error("header comment has no @version tag")]
	MissingVersion,
}

impl AnnotationError {
	/// Returns `true` for well-formed input that is missing required
	/// information, as opposed to input that does not follow the grammar.
	pub fn is_schema(&self) -> bool {
		matches!(self, Self::MissingVersion)
	}

	/// Line the error was detected on, if it has one.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::Unterminated { line, .. }
			| Self::InvalidDirective { line, .. }
			| Self::UnbalancedBraces { line, .. }
			| Self::NoDeclarations { line, .. } => Some(*line),
			Self::MissingVersion => None,
		}
	}
}
