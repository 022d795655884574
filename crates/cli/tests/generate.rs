use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use dpgen_cli::{Cli, Command, Error};
use dpgen_registry::ErrorKind;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MODULE_IDS: &str = r#"/**
 * @file Kernel_module_ids.h
 * @brief Module IDs.
 *
 * @version 0.1
 */

#define KERNEL_MOD_ID_SHIFT (10)

/**
 * @brief Kernel module (system group) ID.
 */
#define MOD_ID_KERNEL ((ModuleId)(0x01 << KERNEL_MOD_ID_SHIFT))

/**
 * @brief Eps module (components group) ID.
 */
#define MOD_ID_EPS ((ModuleId)(0x02 << KERNEL_MOD_ID_SHIFT))
"#;

const ROOT: &str = r#"/**
 * @file DataPool_struct.h
 * @brief DataPool definition.
 *
 * @version 0.1
 */

#include "components/eps/Eps_dp_struct.h"

typedef struct _DataPool {
	/**
	 * @brief Set once the kernel is up.
	 *
	 * @dp 1
	 */
	bool INITIALISED;

	/**
	 * @brief EPS parameters.
	 *
	 * @dp_module EPS
	 */
	Eps_Dp EPS;
} DataPool;

extern DataPool DP;
"#;

const EPS_ERRORS: &str = r#"/**
 * @brief The EPS did not reply in time.
 */
#define EPS_ERROR_UART_TIMEOUT ((ErrorCode)(MOD_ID_EPS | 1))

/**
 * @brief The reply frame failed its CRC check.
 */
#define EPS_ERROR_CRC ((ErrorCode)(MOD_ID_EPS | 2))
"#;

const EPS_EVENTS: &str = r#"/**
 * @brief The EPS finished a command.
 */
#define EVT_EPS_COMMAND_COMPLETE ((Event)(MOD_ID_EPS | 1))
"#;

const ARTIFACTS: [&str; 5] = [
	"DataPool_generated.c",
	"DataPool_generated.h",
	"DataPool_generated.json",
	"const_db.bin",
	"const_db.json",
];

fn eps_struct(members: &[(&str, &str, u32)]) -> String {
	let mut body = String::new();
	for (ty, name, index) in members {
		body.push_str(&format!("\t/**\n\t * @brief {name}.\n\t *\n\t * @dp {index}\n\t */\n\t{ty} {name};\n\n"));
	}
	format!(
		"/**\n * @file Eps_dp_struct.h\n * @brief EPS parameters.\n *\n * @version 0.1\n */\n\ntypedef struct _Eps_Dp {{\n{body}}} Eps_Dp;\n"
	)
}

struct Fixture {
	dir: TempDir,
}

impl Fixture {
	fn new() -> Self {
		let fixture = Self {
			dir: tempfile::tempdir().expect("must create tempdir"),
		};
		fixture.write("dpgen.toml", "");
		fixture.write("src/system/kernel/Kernel_module_ids.h", MODULE_IDS);
		fixture.write("src/system/data_pool/DataPool_struct.h", ROOT);
		fixture.write(
			"src/components/eps/Eps_dp_struct.h",
			&eps_struct(&[("bool", "INITIALISED", 1), ("uint8_t", "FIELD", 3)]),
		);
		fixture.write("src/components/eps/Eps_errors.h", EPS_ERRORS);
		fixture.write("src/components/eps/Eps_events.h", EPS_EVENTS);
		fixture
	}

	fn path(&self, rel: &str) -> PathBuf {
		self.dir.path().join(rel)
	}

	fn write(&self, rel: &str, text: &str) {
		let path = self.path(rel);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, text).unwrap();
	}

	fn cli(&self, command: Command) -> Cli {
		Cli {
			config: Some(self.path("dpgen.toml")),
			source_root: None,
			out_dir: None,
			verbose: false,
			command,
		}
	}

	fn run(&self, command: Command) -> Result<String, Error> {
		let mut out = Vec::new();
		dpgen_cli::run(&self.cli(command), &mut out)?;
		Ok(String::from_utf8(out).unwrap())
	}

	fn out_dir(&self) -> PathBuf {
		self.path("generated")
	}

	fn artifacts(&self) -> Vec<(String, Vec<u8>)> {
		let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(self.out_dir())
			.unwrap()
			.map(|e| {
				let e = e.unwrap();
				(e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
			})
			.collect();
		files.sort();
		files
	}
}

fn names(files: &[(String, Vec<u8>)]) -> Vec<&str> {
	files.iter().map(|(name, _)| name.as_str()).collect()
}

#[test]
fn all_writes_every_artifact_deterministically() {
	let fixture = Fixture::new();
	fixture.run(Command::All).unwrap();
	let first = fixture.artifacts();
	assert_eq!(names(&first), ARTIFACTS);

	let table: serde_json::Value =
		serde_json::from_slice(&fs::read(fixture.out_dir().join("DataPool_generated.json")).unwrap()).unwrap();
	assert_eq!(table["version"], "0.1");
	assert_eq!(table["parameters"][2]["symbol"], "DP.EPS.FIELD");
	assert_eq!(table["parameters"][2]["composite_id"], 0x0803);

	let db: serde_json::Value =
		serde_json::from_slice(&fs::read(fixture.out_dir().join("const_db.json")).unwrap()).unwrap();
	assert_eq!(db["errors"][1]["symbol"], "EPS_ERROR_CRC");
	assert_eq!(db["errors"][1]["value"], 0x0802);
	assert_eq!(db["events"][0]["module"], "Eps");
	assert_eq!(db["datapool"][1]["module"], "Eps");

	let source = String::from_utf8(fs::read(fixture.out_dir().join("DataPool_generated.c")).unwrap()).unwrap();
	assert!(source.contains("    case 0x0803:\n        *pp_data_out = &DP.EPS.FIELD;\n"));

	fixture.run(Command::All).unwrap();
	assert_eq!(fixture.artifacts(), first);
}

#[test]
fn separate_stages_match_a_combined_run() {
	let staged = Fixture::new();
	staged.run(Command::Datapool).unwrap();
	assert_eq!(
		names(&staged.artifacts()),
		["DataPool_generated.c", "DataPool_generated.h", "DataPool_generated.json"]
	);
	staged.run(Command::Constdb).unwrap();

	let combined = Fixture::new();
	combined.run(Command::All).unwrap();
	assert_eq!(staged.artifacts(), combined.artifacts());
}

#[test]
fn constdb_requires_a_persisted_parameter_table() {
	let fixture = Fixture::new();
	let err = fixture.run(Command::Constdb).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Io);
	assert!(err.to_string().contains("DataPool_generated.json"), "{err}");
}

#[test]
fn duplicate_index_writes_nothing() {
	let fixture = Fixture::new();
	fixture.write(
		"src/components/eps/Eps_dp_struct.h",
		&eps_struct(&[("bool", "FIRST", 5), ("bool", "SECOND", 5)]),
	);
	let err = fixture.run(Command::All).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Allocation);
	assert!(!fixture.out_dir().exists());
}

#[test]
fn unknown_constant_module_writes_nothing() {
	let fixture = Fixture::new();
	fixture.write(
		"src/components/xyz/Xyz_errors.h",
		"/** @brief Broken. */\n#define XYZ_ERROR ((ErrorCode)(XYZ | 1))\n",
	);
	let err = fixture.run(Command::All).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Schema);
	assert_eq!(err.to_string(), "components/xyz/Xyz_errors.h: line 2: unknown module 'XYZ'");
	assert!(!fixture.out_dir().exists());
}

#[cfg(unix)]
#[test]
fn unreadable_source_entry_aborts_the_run() {
	let fixture = Fixture::new();
	std::os::unix::fs::symlink(fixture.path("src/nowhere"), fixture.path("src/components/broken")).unwrap();

	let err = fixture.run(Command::All).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Io);
	assert!(err.to_string().contains("broken"), "{err}");
	assert!(!fixture.out_dir().exists());

	let output = Process::new(env!("CARGO_BIN_EXE_dpgen"))
		.arg("--config")
		.arg(fixture.path("dpgen.toml"))
		.arg("all")
		.output()
		.unwrap();
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error[io]"));
	assert!(!fixture.out_dir().exists());
}

#[test]
fn failed_run_keeps_previous_artifacts() {
	let fixture = Fixture::new();
	fixture.run(Command::All).unwrap();
	let before = fixture.artifacts();

	fixture.write("src/components/eps/Eps_dp_struct.h", &eps_struct(&[("bool", "FAR", 2050)]));
	assert_eq!(fixture.run(Command::All).unwrap_err().kind(), ErrorKind::Allocation);
	assert_eq!(fixture.artifacts(), before);
}

#[test]
fn deps_lists_absolute_include_paths() {
	let fixture = Fixture::new();
	let out = fixture.run(Command::Deps).unwrap();
	let expected = std::path::absolute(fixture.path("src/components/eps/Eps_dp_struct.h")).unwrap();
	assert_eq!(out, format!("{}\n", expected.display()));
}

#[test]
fn duplicate_values_follow_the_configured_policy() {
	let fixture = Fixture::new();
	fixture.write(
		"src/components/eps/Eps_errors.h",
		"#define EPS_ERROR_ONE ((ErrorCode)(MOD_ID_EPS | 1))\n#define EPS_ERROR_TWO ((ErrorCode)(MOD_ID_EPS | 1))\n",
	);
	fixture.run(Command::All).unwrap();

	fixture.write("dpgen.toml", "[constants]\nduplicate_values = \"deny\"\n");
	let err = fixture.run(Command::All).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Allocation);
	assert_eq!(err.to_string(), "components/eps/Eps_errors.h: errors value 0x0801 shared by 'EPS_ERROR_ONE' and 'EPS_ERROR_TWO'");
}

#[test]
fn config_controls_layout_and_outputs() {
	let fixture = Fixture::new();
	fixture.write("dpgen.toml", "out_dir = \"build/gen\"\n\n[constants]\nblob = false\n");
	fixture.run(Command::All).unwrap();
	assert!(fixture.path("build/gen/const_db.json").is_file());
	assert!(!fixture.path("build/gen/const_db.bin").exists());
}

#[test]
fn command_line_overrides_config() {
	let fixture = Fixture::new();
	let cli = Cli {
		out_dir: Some(fixture.path("elsewhere")),
		..fixture.cli(Command::Datapool)
	};
	dpgen_cli::run(&cli, &mut Vec::new()).unwrap();
	assert!(fixture.path("elsewhere/DataPool_generated.h").is_file());
	assert!(!fixture.out_dir().exists());
}

#[test]
fn config_errors_are_parse_errors() {
	let fixture = Fixture::new();
	fixture.write("dpgen.toml", "[layout]\nindex_bit = 10\n");
	assert_eq!(fixture.run(Command::All).unwrap_err().kind(), ErrorKind::Parse);

	fixture.write("dpgen.toml", "[layout]\nindex_bits = 12\n");
	assert_eq!(fixture.run(Command::All).unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn binary_reports_error_kind_and_fails() {
	let fixture = Fixture::new();
	fixture.write(
		"src/components/eps/Eps_dp_struct.h",
		&eps_struct(&[("bool", "FIRST", 5), ("bool", "SECOND", 5)]),
	);
	let output = Process::new(env!("CARGO_BIN_EXE_dpgen"))
		.arg("--config")
		.arg(fixture.path("dpgen.toml"))
		.arg("all")
		.output()
		.unwrap();
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error[allocation]: components/eps/Eps_dp_struct.h: duplicate index 5 in module Eps"), "{stderr}");
}

#[test]
fn binary_prints_deps() {
	let fixture = Fixture::new();
	let output = Process::new(env!("CARGO_BIN_EXE_dpgen"))
		.args(["deps", "--config"])
		.arg(fixture.path("dpgen.toml"))
		.output()
		.unwrap();
	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	assert!(Path::new(stdout.trim_end()).ends_with("src/components/eps/Eps_dp_struct.h"), "{stdout}");
}
