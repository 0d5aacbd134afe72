use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::trace;

use rehome_patch::FileMode;

use crate::Error;

/// The metadata of an installed package, as stored in `conda-meta/<name>-<version>-<build>.json`.
///
/// Only the fields required for relocation are read; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub build: Option<String>,
    paths_data: PathsData,
}

#[derive(Debug, Clone, Deserialize)]
struct PathsData {
    paths: Vec<PathEntry>,
}

/// A file installed by a package.
#[derive(Debug, Clone, Deserialize)]
pub struct PathEntry {
    /// The path of the file, relative to the environment root.
    #[serde(rename = "_path")]
    pub path: PathBuf,
    pub path_type: Option<String>,
    /// How the placeholder is embedded in the file, if the file contains one.
    pub file_mode: Option<FileMode>,
    /// The placeholder the package was built with.
    pub prefix_placeholder: Option<String>,
    pub sha256: Option<String>,
    pub size_in_bytes: Option<u64>,
}

/// A file whose embedded placeholder must be rewritten on relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The path of the file, relative to the environment root.
    pub path: PathBuf,
    pub mode: FileMode,
    /// The placeholder the package was built with; its length is the capacity of binary fields.
    pub placeholder: String,
}

impl Manifest {
    /// Read a [`Manifest`] from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        trace!("Reading manifest: {}", path.display());
        let contents = fs_err::read(path)?;
        Self::from_slice(&contents)
    }

    /// Parse a [`Manifest`] from JSON bytes.
    pub fn from_slice(contents: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(contents)?)
    }

    /// All files installed by the package.
    pub fn paths(&self) -> &[PathEntry] {
        &self.paths_data.paths
    }

    /// The files that carry both a [`FileMode`] and a placeholder.
    ///
    /// Files without either (e.g., data files without an embedded path) are skipped.
    pub fn eligible_entries(&self) -> impl Iterator<Item = FileEntry> + '_ {
        self.paths().iter().filter_map(|entry| {
            let (Some(mode), Some(placeholder)) = (entry.file_mode, &entry.prefix_placeholder)
            else {
                return None;
            };
            Some(FileEntry {
                path: entry.path.clone(),
                mode,
                placeholder: placeholder.clone(),
            })
        })
    }

    /// A human-readable identifier for the package, like `zlib-1.3.1-h4ab18f5_1`.
    pub fn package(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(match (&self.version, &self.build) {
            (Some(version), Some(build)) => format!("{name}-{version}-{build}"),
            (Some(version), None) => format!("{name}-{version}"),
            _ => name.to_string(),
        })
    }
}
