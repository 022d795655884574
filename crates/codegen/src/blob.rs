//! Binary constant database: an 8-byte magic, a little-endian schema version
//! and the postcard-encoded tables.

use dpgen_registry::ConstantDatabase;
use thiserror::Error;

pub const CONST_DB_BLOB_FILE: &str = "const_db.bin";

/// Magic bytes identifying a constant database blob.
pub const MAGIC: &[u8; 8] = b"DPGENCDB";

/// Schema version for blob format compatibility.
pub const SCHEMA_VERSION: u32 = 1;

/// Total header size in bytes (magic + version).
pub const HEADER_SIZE: usize = MAGIC.len() + size_of::<u32>();

#[derive(Debug, Error)]
pub enum BlobError {
	#[error("blob is {0} bytes, shorter than its header")]
	Truncated(usize),
	#[error("blob magic mismatch")]
	BadMagic,
	#[error("blob schema version {found}, expected {SCHEMA_VERSION}")]
	Version { found: u32 },
	#[error(transparent)]
	Postcard(#[from] postcard::Error),
}

/// Encodes `db` behind the blob header.
pub fn write_blob(db: &ConstantDatabase) -> Result<Vec<u8>, BlobError> {
	let payload = postcard::to_allocvec(db)?;
	let mut blob = Vec::with_capacity(HEADER_SIZE + payload.len());
	blob.extend_from_slice(MAGIC);
	blob.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
	blob.extend_from_slice(&payload);
	Ok(blob)
}

/// Validates the header and decodes the tables.
pub fn read_blob(data: &[u8]) -> Result<ConstantDatabase, BlobError> {
	if data.len() < HEADER_SIZE {
		return Err(BlobError::Truncated(data.len()));
	}
	let (magic, rest) = data.split_at(MAGIC.len());
	if magic != MAGIC {
		return Err(BlobError::BadMagic);
	}
	let (version, payload) = rest.split_at(size_of::<u32>());
	let found = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
	if found != SCHEMA_VERSION {
		return Err(BlobError::Version { found });
	}
	Ok(postcard::from_bytes(payload)?)
}
