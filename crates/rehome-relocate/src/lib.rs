//! Relocate an install root from one prefix to another.
//!
//! Every `*.json` manifest in the metadata directory lists the files of one installed package.
//! Each file that was built with a placeholder is rewritten from the current prefix to the new one,
//! in the mode the manifest records for it.

use std::path::PathBuf;

use thiserror::Error;

use rehome_fs::Simplified;

pub use relocator::{FileOutcome, RelocationRequest, RelocationSummary, Relocator, relocate};
pub use reporter::Reporter;

mod relocator;
mod reporter;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Metadata directory does not exist: `{}`", _0.user_display())]
    MissingMetadataDir(PathBuf),
    #[error("Failed to read manifest: `{}`", path.user_display())]
    Manifest {
        path: PathBuf,
        #[source]
        err: rehome_manifest::Error,
    },
}
