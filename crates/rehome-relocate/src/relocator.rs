use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use rehome_fs::Simplified;
use rehome_manifest::{FileEntry, Manifest};
use rehome_patch::Outcome;

use crate::{Error, Reporter};

/// What to relocate, and where to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRequest {
    /// The root of the install; manifest paths are relative to it.
    pub root: PathBuf,
    /// The directory containing the package manifests.
    pub metadata_dir: PathBuf,
    /// The prefix currently embedded in the installed files.
    pub current_placeholder: String,
    /// The prefix to embed instead.
    pub new_placeholder: String,
}

impl RelocationRequest {
    /// Relocate `root` from `current` to `new`, reading the manifests from `<root>/conda-meta`.
    pub fn new(
        root: impl Into<PathBuf>,
        current: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        let root = root.into();
        Self {
            metadata_dir: root.join("conda-meta"),
            root,
            current_placeholder: current.into(),
            new_placeholder: new.into(),
        }
    }

    /// Read the manifests from `metadata_dir` instead.
    #[must_use]
    pub fn with_metadata_dir(self, metadata_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            ..self
        }
    }
}

/// What happened to a single file listed in a manifest.
#[derive(Debug)]
pub enum FileOutcome {
    /// The placeholders in the file were replaced.
    Rewritten,
    /// The file didn't contain the current placeholder.
    Unchanged,
    /// The file is listed in the manifest, but doesn't exist.
    Skipped,
    /// The file could not be relocated.
    Failed(rehome_patch::Error),
}

impl From<Outcome> for FileOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Rewritten => Self::Rewritten,
            Outcome::Unchanged => Self::Unchanged,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelocationSummary {
    pub manifests: usize,
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RelocationSummary {
    /// The total number of files processed.
    pub fn files(&self) -> usize {
        self.rewritten + self.unchanged + self.skipped + self.failed
    }

    /// Returns `true` if every file was relocated (or didn't need to be).
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Rewritten => self.rewritten += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Relocate every file listed in the manifests of an install root.
pub struct Relocator<'a> {
    request: &'a RelocationRequest,
    reporter: Option<Arc<dyn Reporter>>,
    dry_run: bool,
}

impl<'a> Relocator<'a> {
    /// Initialize a new relocator.
    pub fn new(request: &'a RelocationRequest) -> Self {
        Self {
            request,
            reporter: None,
            dry_run: false,
        }
    }

    /// Set the [`Reporter`] to use for this relocation.
    #[must_use]
    pub fn with_reporter(self, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            reporter: Some(reporter),
            ..self
        }
    }

    /// Determine the outcome for every file without modifying any of them.
    #[must_use]
    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }

    /// Relocate the install root.
    ///
    /// Files that are missing or fail to relocate are reported and counted, but don't abort the
    /// run. A manifest that can't be read does, since every file it lists would be left behind.
    #[instrument(skip_all, fields(root = %self.request.root.user_display()))]
    pub fn relocate(self) -> Result<RelocationSummary, Error> {
        let RelocationRequest {
            root,
            metadata_dir,
            current_placeholder,
            new_placeholder,
        } = self.request;

        let mut summary = RelocationSummary::default();
        for path in manifests(metadata_dir)? {
            let manifest = Manifest::from_path(&path).map_err(|err| Error::Manifest {
                path: path.clone(),
                err,
            })?;
            summary.manifests += 1;

            let entries = manifest.eligible_entries().collect::<Vec<_>>();
            debug!(
                "Relocating {} file(s) of {}",
                entries.len(),
                manifest
                    .package()
                    .unwrap_or_else(|| path.user_display().to_string())
            );
            if let Some(reporter) = &self.reporter {
                reporter.on_manifest(&path, entries.len());
            }

            for entry in entries {
                let target = root.join(&entry.path);
                let outcome =
                    self.relocate_file(&target, &entry, current_placeholder, new_placeholder);
                summary.record(&outcome);
                if let Some(reporter) = &self.reporter {
                    reporter.on_file(&target, &outcome);
                }
            }
        }

        if let Some(reporter) = &self.reporter {
            reporter.on_complete(&summary);
        }
        Ok(summary)
    }

    fn relocate_file(
        &self,
        path: &Path,
        entry: &FileEntry,
        current: &str,
        new: &str,
    ) -> FileOutcome {
        // A dangling symlink counts as missing, too.
        if !path.exists() {
            warn!("Skipping missing file: `{}`", path.user_display());
            return FileOutcome::Skipped;
        }

        let result = if self.dry_run {
            rehome_patch::check_prefix(path, &entry.placeholder, current, new, entry.mode)
        } else {
            rehome_patch::update_prefix(path, &entry.placeholder, current, new, entry.mode)
        };
        match result {
            Ok(outcome) => FileOutcome::from(outcome),
            Err(err) => {
                warn!("Failed to relocate `{}`: {err}", path.user_display());
                FileOutcome::Failed(err)
            }
        }
    }
}

/// Relocate the install root described by `request`, without reporting progress.
pub fn relocate(request: &RelocationRequest) -> Result<RelocationSummary, Error> {
    Relocator::new(request).relocate()
}

/// Return the manifests in `metadata_dir`, sorted by path.
///
/// Only `*.json` files directly inside the directory are manifests.
fn manifests(metadata_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !metadata_dir.is_dir() {
        return Err(Error::MissingMetadataDir(metadata_dir.to_path_buf()));
    }
    let mut manifests = rehome_fs::files(metadata_dir)
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    manifests.sort();
    Ok(manifests)
}
