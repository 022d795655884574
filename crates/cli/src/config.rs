//! `dpgen.toml` configuration.
//!
//! Every field has a default, so an absent file or an empty one describes the
//! standard firmware layout:
//!
//! ```toml
//! source_root = "src"
//! out_dir = "generated"
//!
//! [datapool]
//! root = "system/data_pool/DataPool_struct.h"
//! root_type = "DataPool"
//! root_symbol = "DP"
//!
//! [modules]
//! path = "system/kernel/Kernel_module_ids.h"
//!
//! [layout]
//! index_bits = 10
//! module_id_bits = 6
//!
//! [constants]
//! duplicate_values = "warn"
//! ```

use std::path::{Path, PathBuf};

use dpgen_codegen::DispatchOptions;
use dpgen_registry::{
	ConstantOptions, DEFAULT_SHIFT_SYMBOL, DataPoolOptions, DuplicateValuePolicy, ID_BITS, IdLayout,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{path}: {source}")]
	Read { path: String, source: std::io::Error },
	#[error("{path}: {source}")]
	Parse { path: String, source: toml::de::Error },
	#[error("layout of {index_bits} index bits and {module_id_bits} module ID bits does not fill {ID_BITS} bits")]
	Layout { index_bits: u8, module_id_bits: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Directory include paths are relative to.
	pub source_root: PathBuf,
	/// Directory artifacts are written to.
	pub out_dir: PathBuf,
	pub datapool: DataPoolSection,
	pub modules: ModulesSection,
	pub layout: LayoutSection,
	pub constants: ConstantsSection,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			source_root: PathBuf::from("src"),
			out_dir: PathBuf::from("generated"),
			datapool: DataPoolSection::default(),
			modules: ModulesSection::default(),
			layout: LayoutSection::default(),
			constants: ConstantsSection::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataPoolSection {
	/// Root definition file, relative to the source root.
	pub root: PathBuf,
	pub root_type: String,
	pub root_symbol: String,
	/// Module name of root-level parameters in the constant database.
	pub root_module: String,
	pub public_include: String,
	pub generated_include: String,
}

impl Default for DataPoolSection {
	fn default() -> Self {
		let datapool = DataPoolOptions::default();
		let dispatch = DispatchOptions::default();
		Self {
			root: PathBuf::from("system/data_pool/DataPool_struct.h"),
			root_type: datapool.root_type,
			root_symbol: datapool.root_symbol,
			root_module: ConstantOptions::default().root_module,
			public_include: dispatch.public_include,
			generated_include: dispatch.generated_include,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesSection {
	/// Module ID header, relative to the source root.
	pub path: PathBuf,
	pub shift_symbol: String,
}

impl Default for ModulesSection {
	fn default() -> Self {
		Self {
			path: PathBuf::from("system/kernel/Kernel_module_ids.h"),
			shift_symbol: DEFAULT_SHIFT_SYMBOL.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
	pub index_bits: u8,
	pub module_id_bits: u8,
	pub check_duplicate_index: bool,
}

impl Default for LayoutSection {
	fn default() -> Self {
		let layout = IdLayout::default();
		Self {
			index_bits: layout.index_bits(),
			module_id_bits: layout.module_id_bits(),
			check_duplicate_index: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstantsSection {
	pub error_suffix: String,
	pub event_suffix: String,
	pub error_type: String,
	pub event_type: String,
	pub duplicate_values: DuplicateValuePolicy,
	/// Also write the binary `const_db.bin`.
	pub blob: bool,
}

impl Default for ConstantsSection {
	fn default() -> Self {
		let options = ConstantOptions::default();
		Self {
			error_suffix: "_errors.h".to_string(),
			event_suffix: "_events.h".to_string(),
			error_type: options.error_type,
			event_type: options.event_type,
			duplicate_values: options.duplicate_values,
			blob: true,
		}
	}
}

impl Config {
	/// Parses a config file. Relative `source_root` and `out_dir` are taken
	/// relative to the file's directory.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.display().to_string(),
			source,
		})?;
		let mut config = Self::parse(&text).map_err(|source| ConfigError::Parse {
			path: path.display().to_string(),
			source,
		})?;
		if let Some(base) = path.parent() {
			config.source_root = base.join(&config.source_root);
			config.out_dir = base.join(&config.out_dir);
		}
		Ok(config)
	}

	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	pub fn layout(&self) -> Result<IdLayout, ConfigError> {
		let LayoutSection {
			index_bits,
			module_id_bits,
			..
		} = self.layout;
		IdLayout::new(index_bits, module_id_bits).ok_or(ConfigError::Layout {
			index_bits,
			module_id_bits,
		})
	}

	pub fn root_path(&self) -> PathBuf {
		self.source_root.join(&self.datapool.root)
	}

	pub fn modules_path(&self) -> PathBuf {
		self.source_root.join(&self.modules.path)
	}

	pub fn datapool_options(&self) -> DataPoolOptions {
		DataPoolOptions {
			root_type: self.datapool.root_type.clone(),
			root_symbol: self.datapool.root_symbol.clone(),
			check_duplicate_index: self.layout.check_duplicate_index,
		}
	}

	pub fn dispatch_options(&self) -> DispatchOptions {
		DispatchOptions {
			public_include: self.datapool.public_include.clone(),
			generated_include: self.datapool.generated_include.clone(),
		}
	}

	pub fn constant_options(&self) -> ConstantOptions {
		ConstantOptions {
			error_type: self.constants.error_type.clone(),
			event_type: self.constants.event_type.clone(),
			root_module: self.datapool.root_module.clone(),
			duplicate_values: self.constants.duplicate_values,
		}
	}
}
