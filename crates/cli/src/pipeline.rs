//! File discovery and the two generation stages.

use std::path::{Path, PathBuf};

use dpgen_annotations::includes;
use dpgen_codegen::{PARAMETER_TABLE_FILE, parse_parameter_table};
use dpgen_registry::{ConstantDatabase, DataPool, ModuleTable, ParameterTable, SourceFile, Warning};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::Error;
use crate::config::Config;

fn read_source(config: &Config, path: &Path) -> Result<SourceFile, Error> {
	let display = path.strip_prefix(&config.source_root).unwrap_or(path);
	Ok(SourceFile::read(path, display)?)
}

pub fn load_module_table(config: &Config) -> Result<ModuleTable, Error> {
	let file = read_source(config, &config.modules_path())?;
	Ok(ModuleTable::parse(&file, config.layout()?, &config.modules.shift_symbol)?)
}

/// Reads the root definition and the files it includes, then builds the
/// parameter registry.
pub fn build_datapool(config: &Config, modules: &ModuleTable) -> Result<DataPool, Error> {
	let root = read_source(config, &config.root_path())?;
	let included = includes(&root.text)
		.map_err(|source| dpgen_registry::Error::Annotation {
			file: root.name(),
			source,
		})?
		.iter()
		.map(|include| read_source(config, &config.source_root.join(include)))
		.collect::<Result<Vec<_>, _>>()?;

	let pool = dpgen_registry::build_datapool(&root, &included, modules, &config.datapool_options())?;
	info!(
		parameters = pool.registry.len(),
		types = pool.registry.data_types().len(),
		version = %pool.version,
		"DataPool registry built"
	);
	Ok(pool)
}

/// Files under the source root whose name ends with `suffix`, sorted by path.
///
/// Symlinks are followed. Any directory or entry that cannot be read fails
/// the walk.
pub fn discover(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, Error> {
	let mut paths = Vec::new();
	for entry in WalkDir::new(root).follow_links(true) {
		let entry = entry.map_err(|e| {
			let path = e.path().unwrap_or(root).to_path_buf();
			Error::io(&path, e.into())
		})?;
		if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(suffix) {
			paths.push(entry.into_path());
		}
	}
	paths.sort();
	Ok(paths)
}

fn read_all(config: &Config, paths: &[PathBuf]) -> Result<Vec<SourceFile>, Error> {
	paths.iter().map(|path| read_source(config, path)).collect()
}

/// Reads the parameter table a previous `datapool` run persisted.
pub fn load_parameter_table(config: &Config) -> Result<ParameterTable, Error> {
	let path = config.out_dir.join(PARAMETER_TABLE_FILE);
	let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
	parse_parameter_table(&text).map_err(|source| Error::Table {
		path: path.display().to_string(),
		source,
	})
}

pub fn build_constant_db(
	config: &Config,
	modules: &ModuleTable,
	parameters: &ParameterTable,
) -> Result<(ConstantDatabase, Vec<Warning>), Error> {
	let errors = discover(&config.source_root, &config.constants.error_suffix)?;
	let events = discover(&config.source_root, &config.constants.event_suffix)?;
	debug!(errors = errors.len(), events = events.len(), "discovered constant files");

	let (db, warnings) = dpgen_registry::build_constant_db(
		modules,
		&read_all(config, &errors)?,
		&read_all(config, &events)?,
		Some(parameters),
		&config.constant_options(),
	)?;
	info!(
		modules = db.modules.len(),
		errors = db.errors.len(),
		events = db.events.len(),
		datapool = db.datapool.len(),
		"constant database built"
	);
	Ok((db, warnings))
}

/// Absolute paths of the root definition's includes.
pub fn dependencies(config: &Config) -> Result<Vec<PathBuf>, Error> {
	let root = read_source(config, &config.root_path())?;
	let paths = includes(&root.text).map_err(|source| dpgen_registry::Error::Annotation {
		file: root.name(),
		source,
	})?;
	paths
		.iter()
		.map(|include| {
			let path = config.source_root.join(include);
			std::path::absolute(&path).map_err(|e| Error::io(&path, e))
		})
		.collect()
}
