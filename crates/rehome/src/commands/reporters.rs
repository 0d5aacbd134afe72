use std::error::Error;
use std::fmt::Write;
use std::iter;
use std::path::Path;

use owo_colors::OwoColorize;

use rehome_fs::Simplified;
use rehome_relocate::{FileOutcome, RelocationSummary};
use rehome_warnings::warn_user;

use crate::commands::count;
use crate::printer::Printer;

/// Reports the progress of a relocation to the user.
///
/// Missing and failed files are surfaced as warnings. With `--verbose`, every file that is
/// rewritten or left unchanged is listed on stderr. With `--dry-run`, every manifest and the
/// outcome of every file it lists are printed to stdout instead.
#[derive(Debug)]
pub(crate) struct RelocateReporter {
    printer: Printer,
    dry_run: bool,
}

impl From<Printer> for RelocateReporter {
    fn from(printer: Printer) -> Self {
        Self {
            printer,
            dry_run: false,
        }
    }
}

impl RelocateReporter {
    #[must_use]
    pub(crate) fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }
}

/// Join an error and its sources into a single line.
fn chain(err: &(dyn Error + 'static)) -> String {
    iter::successors(Some(err), |&err| err.source())
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

impl rehome_relocate::Reporter for RelocateReporter {
    fn on_manifest(&self, manifest: &Path, files: usize) {
        if self.dry_run {
            let _ = writeln!(
                self.printer.stdout(),
                "{} ({})",
                manifest.user_display().bold(),
                count(files, "file")
            );
        }
    }

    fn on_file(&self, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped => {
                warn_user!(
                    "Skipping `{}`, which is listed in a manifest but does not exist",
                    path.user_display()
                );
            }
            FileOutcome::Failed(err) => {
                warn_user!(
                    "Failed to relocate `{}`: {}",
                    path.user_display(),
                    chain(err)
                );
            }
            FileOutcome::Rewritten if !self.dry_run => {
                let _ = writeln!(
                    self.printer.files(),
                    "{} {}",
                    "Rewrote".green().bold(),
                    path.user_display()
                );
            }
            FileOutcome::Unchanged if !self.dry_run => {
                let _ = writeln!(
                    self.printer.files(),
                    "{}",
                    format!("Unchanged {}", path.user_display()).dimmed()
                );
            }
            FileOutcome::Rewritten | FileOutcome::Unchanged => {}
        }

        if self.dry_run {
            let status = match outcome {
                FileOutcome::Rewritten => "rewrite".green().to_string(),
                FileOutcome::Unchanged => "unchanged".dimmed().to_string(),
                FileOutcome::Skipped => "missing".yellow().to_string(),
                FileOutcome::Failed(_) => "error".red().to_string(),
            };
            let _ = writeln!(
                self.printer.stdout(),
                " {status} {}",
                path.user_display()
            );
        }
    }

    fn on_complete(&self, summary: &RelocationSummary) {
        if self.dry_run {
            let _ = writeln!(
                self.printer.stdout(),
                "Would relocate {} from {}",
                count(summary.rewritten, "file").bold(),
                count(summary.manifests, "manifest")
            );
        }
    }
}
