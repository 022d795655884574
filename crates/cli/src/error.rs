use std::path::Path;

use dpgen_codegen::EmitError;
use dpgen_registry::ErrorKind;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal error of a `dpgen` run.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Registry(#[from] dpgen_registry::Error),

	#[error(transparent)]
	Emit(#[from] EmitError),

	/// The persisted parameter table could not be decoded.
	#[error("{path}: {source}")]
	Table { path: String, source: serde_json::Error },

	#[error("{path}: {source}")]
	Io { path: String, source: std::io::Error },
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(ConfigError::Read { .. }) | Self::Emit(_) | Self::Io { .. } => ErrorKind::Io,
			Self::Config(_) | Self::Table { .. } => ErrorKind::Parse,
			Self::Registry(e) => e.kind(),
		}
	}

	pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
		Self::Io {
			path: path.display().to_string(),
			source,
		}
	}
}
