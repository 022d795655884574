//! `dpgen` binary.

use std::process::ExitCode;

use clap::Parser;
use dpgen_cli::Cli;
// The library half of this package owns these dependencies.
#[allow(unused_imports, reason = "dependencies used only by the dpgen-cli library target")]
use {
	dpgen_annotations as _, dpgen_codegen as _, dpgen_registry as _, serde as _, serde_json as _, tempfile as _,
	thiserror as _, toml as _, tracing as _, walkdir as _,
};

fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match try_main(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			match e.downcast_ref::<dpgen_cli::Error>() {
				Some(err) => eprintln!("error[{}]: {err}", err.kind()),
				None => eprintln!("error: {e:#}"),
			}
			ExitCode::FAILURE
		}
	}
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
	let stdout = std::io::stdout();
	dpgen_cli::run(cli, &mut stdout.lock())?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("dpgen=debug,dpgen_cli=debug,dpgen_registry=debug,dpgen_codegen=debug,warn")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
