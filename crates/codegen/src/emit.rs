use dpgen_registry::{ConstantDatabase, DataPool};
use thiserror::Error;
use tracing::debug;

use crate::blob::{BlobError, CONST_DB_BLOB_FILE, write_blob};
use crate::dispatch::{DispatchOptions, HEADER_FILE, SOURCE_FILE, render_header, render_source};
use crate::tables::{CONST_DB_FILE, PARAMETER_TABLE_FILE, render_constant_db, render_parameter_table};

/// A rendered output file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
	pub file_name: &'static str,
	pub contents: Vec<u8>,
}

impl Artifact {
	fn text(file_name: &'static str, contents: String) -> Self {
		Self {
			file_name,
			contents: contents.into_bytes(),
		}
	}
}

#[derive(Debug, Error)]
pub enum EmitError {
	#[error("failed to encode {file}: {source}")]
	Json {
		file: &'static str,
		source: serde_json::Error,
	},
	#[error("failed to encode {CONST_DB_BLOB_FILE}: {0}")]
	Blob(#[from] BlobError),
}

/// Renders the dispatch header and source and the persisted parameter table.
pub fn datapool_artifacts(pool: &DataPool, options: &DispatchOptions) -> Result<Vec<Artifact>, EmitError> {
	let table = render_parameter_table(&pool.table()).map_err(|source| EmitError::Json {
		file: PARAMETER_TABLE_FILE,
		source,
	})?;
	let artifacts = vec![
		Artifact::text(HEADER_FILE, render_header(pool)),
		Artifact::text(SOURCE_FILE, render_source(pool, options)),
		Artifact::text(PARAMETER_TABLE_FILE, table),
	];
	debug!(parameters = pool.registry.len(), "rendered DataPool artifacts");
	Ok(artifacts)
}

/// Renders `const_db.json` and, when `blob` is set, `const_db.bin`.
pub fn constant_db_artifacts(db: &ConstantDatabase, blob: bool) -> Result<Vec<Artifact>, EmitError> {
	let json = render_constant_db(db).map_err(|source| EmitError::Json {
		file: CONST_DB_FILE,
		source,
	})?;
	let mut artifacts = vec![Artifact::text(CONST_DB_FILE, json)];
	if blob {
		artifacts.push(Artifact {
			file_name: CONST_DB_BLOB_FILE,
			contents: write_blob(db)?,
		});
	}
	Ok(artifacts)
}
