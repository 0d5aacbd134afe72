//! Read the per-package manifests in an environment's metadata directory (`conda-meta/*.json`).

use std::io;
use std::path::Path;

use thiserror::Error;

pub use manifest::{FileEntry, Manifest, PathEntry};

mod manifest;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Manifest is not valid JSON")]
    Parse(#[source] serde_json::Error),
    #[error("Manifest does not contain a valid `paths_data.paths` list")]
    Schema(#[source] serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::Schema(err)
        } else {
            Self::Parse(err)
        }
    }
}

/// Read the manifest at `path` and return the entries that are subject to relocation.
pub fn eligible_entries(path: impl AsRef<Path>) -> Result<Vec<FileEntry>, Error> {
    let manifest = Manifest::from_path(path)?;
    Ok(manifest.eligible_entries().collect())
}
