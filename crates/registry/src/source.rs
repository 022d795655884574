use std::path::{Path, PathBuf};

/// An input file held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	/// Path as given, relative to the source root where possible. Used in
	/// diagnostics and emitted artifacts, never re-read.
	pub path: PathBuf,
	pub text: String,
}

impl SourceFile {
	pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			text: text.into(),
		}
	}

	/// Reads a file, reporting it under `display` (typically the path
	/// relative to the source root).
	pub fn read(path: &Path, display: impl Into<PathBuf>) -> Result<Self, crate::Error> {
		let text = std::fs::read_to_string(path).map_err(|e| crate::Error::io(path, e))?;
		Ok(Self::new(display, text))
	}

	/// Path rendered with forward slashes, stable across platforms.
	pub fn name(&self) -> String {
		self.path.to_string_lossy().replace('\\', "/")
	}

	/// Final path component, for artifact banners.
	pub fn file_name(&self) -> String {
		self.path
			.file_name()
			.map_or_else(|| self.name(), |n| n.to_string_lossy().into_owned())
	}
}
