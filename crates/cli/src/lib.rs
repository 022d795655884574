//! `dpgen` command-line driver.
//!
//! Loads `dpgen.toml`, reads the annotated headers under the source root and
//! writes the generated artifacts. Each subcommand either writes its whole
//! artifact set or nothing.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dpgen_codegen::{constant_db_artifacts, datapool_artifacts};
use dpgen_registry::Warning;
use tracing::{info, warn};
// Only the `dpgen` binary uses these.
#[allow(unused_imports, reason = "dependencies used only by the dpgen binary target")]
use {anyhow as _, tracing_subscriber as _};

mod config;
mod error;
mod output;
mod pipeline;

pub use config::{Config, ConfigError, ConstantsSection, DataPoolSection, LayoutSection, ModulesSection};
pub use error::Error;
pub use output::write_artifacts;
pub use pipeline::discover;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dpgen.toml";

#[derive(Parser, Debug)]
#[command(name = "dpgen")]
#[command(about = "DataPool registry and constant database generator")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file (defaults to ./dpgen.toml when present)
	#[arg(long, short = 'c', global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Override the configured source root
	#[arg(long, global = true, value_name = "DIR")]
	pub source_root: Option<PathBuf>,

	/// Override the configured output directory
	#[arg(long, global = true, value_name = "DIR")]
	pub out_dir: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Generate the DataPool dispatch code and parameter table
	Datapool,
	/// Generate the constant database from a previously written parameter table
	Constdb,
	/// Run both stages, writing every artifact at once
	All,
	/// Print the absolute paths of the files the root definition includes
	Deps,
}

impl Cli {
	/// Resolves the effective configuration: the given or discovered config
	/// file, then command-line overrides.
	pub fn config(&self) -> Result<Config, Error> {
		let mut config = match &self.config {
			Some(path) => Config::load(path)?,
			None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Config::load(Path::new(DEFAULT_CONFIG_FILE))?,
			None => Config::default(),
		};
		if let Some(root) = &self.source_root {
			config.source_root = root.clone();
		}
		if let Some(dir) = &self.out_dir {
			config.out_dir = dir.clone();
		}
		Ok(config)
	}
}

fn report(warnings: &[Warning]) {
	for warning in warnings {
		warn!("{warning}");
	}
}

/// Runs one subcommand. `out` receives the `deps` listing.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), Error> {
	let config = cli.config()?;
	info!(
		command = ?cli.command,
		source_root = %config.source_root.display(),
		out_dir = %config.out_dir.display(),
		"dpgen"
	);
	match cli.command {
		Command::Datapool => {
			let modules = pipeline::load_module_table(&config)?;
			let pool = pipeline::build_datapool(&config, &modules)?;
			report(&pool.warnings);
			write_artifacts(&config.out_dir, &datapool_artifacts(&pool, &config.dispatch_options())?)?;
		}
		Command::Constdb => {
			let modules = pipeline::load_module_table(&config)?;
			let table = pipeline::load_parameter_table(&config)?;
			let (db, warnings) = pipeline::build_constant_db(&config, &modules, &table)?;
			report(&warnings);
			write_artifacts(&config.out_dir, &constant_db_artifacts(&db, config.constants.blob)?)?;
		}
		Command::All => {
			let modules = pipeline::load_module_table(&config)?;
			let pool = pipeline::build_datapool(&config, &modules)?;
			let (db, warnings) = pipeline::build_constant_db(&config, &modules, &pool.table())?;
			report(&pool.warnings);
			report(&warnings);

			let mut artifacts = datapool_artifacts(&pool, &config.dispatch_options())?;
			artifacts.extend(constant_db_artifacts(&db, config.constants.blob)?);
			write_artifacts(&config.out_dir, &artifacts)?;
		}
		Command::Deps => {
			let paths: Vec<String> = pipeline::dependencies(&config)?
				.iter()
				.map(|p| p.display().to_string())
				.collect();
			writeln!(out, "{}", paths.join(" ")).map_err(|e| Error::io(Path::new("<stdout>"), e))?;
		}
	}
	Ok(())
}
