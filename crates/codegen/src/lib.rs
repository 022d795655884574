//! Artifact rendering for dpgen.
//!
//! Everything here renders into memory. Output depends only on the registry
//! contents, so identical input yields byte-identical artifacts.

mod blob;
mod dispatch;
mod emit;
mod tables;

pub use blob::{BlobError, CONST_DB_BLOB_FILE, HEADER_SIZE, MAGIC, SCHEMA_VERSION, read_blob, write_blob};
pub use dispatch::{DispatchOptions, HEADER_FILE, SOURCE_FILE, render_header, render_source, type_tag};
pub use emit::{Artifact, EmitError, constant_db_artifacts, datapool_artifacts};
pub use tables::{
	CONST_DB_FILE, PARAMETER_TABLE_FILE, parse_constant_db, parse_parameter_table, render_constant_db,
	render_parameter_table,
};
