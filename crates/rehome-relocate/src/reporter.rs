use std::path::Path;

use crate::{FileOutcome, RelocationSummary};

/// Receives progress updates from a [`crate::Relocator`].
pub trait Reporter: Send + Sync {
    /// Callback to invoke when a manifest is read, with the number of files it lists for
    /// relocation.
    fn on_manifest(&self, manifest: &Path, files: usize);

    /// Callback to invoke when a file was processed.
    fn on_file(&self, path: &Path, outcome: &FileOutcome);

    /// Callback to invoke when every manifest was processed.
    fn on_complete(&self, summary: &RelocationSummary);
}
