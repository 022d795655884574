//! All-or-nothing artifact writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dpgen_codegen::Artifact;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::Error;


/// Writes every artifact into `out_dir`.
///
/// Contents go to temporary files in `out_dir` first. Existing artifacts are
/// moved into a backup directory before each temporary file is renamed into
/// place; if any step fails, artifacts already replaced are rolled back, so
/// the directory holds either the complete new set or the previous one.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, Error> {
	fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

	let mut staged: Vec<(NamedTempFile, &'static str)> = Vec::with_capacity(artifacts.len());
	for artifact in artifacts {
		let mut tmp = tempfile::Builder::new()
			.prefix(".dpgen-")
			.tempfile_in(out_dir)
			.map_err(|e| Error::io(out_dir, e))?;
		tmp.write_all(&artifact.contents).map_err(|e| Error::io(tmp.path(), e))?;
		staged.push((tmp, artifact.file_name));
	}

	let backup = tempfile::Builder::new()
		.prefix(".dpgen-backup-")
		.tempdir_in(out_dir)
		.map_err(|e| Error::io(out_dir, e))?;

	let mut committed: Vec<Committed> = Vec::with_capacity(staged.len());
	for (tmp, name) in staged {
		match commit(tmp, &out_dir.join(name), &backup.path().join(name)) {
			Ok(done) => committed.push(done),
			Err(e) => {
				rollback(&committed);
				return Err(e);
			}
		}
	}

	let written: Vec<PathBuf> = committed.into_iter().map(|c| c.dest).collect();
	for dest in &written {
		info!(path = %dest.display(), "wrote");
	}
	Ok(written)
}

/// An artifact renamed into place, with the file it replaced.
struct Committed {
	dest: PathBuf,
	previous: Option<PathBuf>,
}

fn commit(tmp: NamedTempFile, dest: &Path, backup: &Path) -> Result<Committed, Error> {
	let previous = if dest.exists() {
		fs::rename(dest, backup).map_err(|e| Error::io(dest, e))?;
		Some(backup.to_path_buf())
	} else {
		None
	};

	if let Err(e) = tmp.persist(dest) {
		if let Some(previous) = &previous {
			restore(previous, dest);
		}
		return Err(Error::io(dest, e.error));
	}
	Ok(Committed {
		dest: dest.to_path_buf(),
		previous,
	})
}

fn rollback(committed: &[Committed]) {
	for done in committed.iter().rev() {
		match &done.previous {
			Some(previous) => restore(previous, &done.dest),
			None => {
				if let Err(e) = fs::remove_file(&done.dest) {
					warn!(path = %done.dest.display(), error = %e, "failed to remove partial artifact");
				}
			}
		}
	}
}

fn restore(previous: &Path, dest: &Path) {
	if let Err(e) = fs::rename(previous, dest) {
		warn!(path = %dest.display(), error = %e, "failed to restore previous artifact");
	}
}
