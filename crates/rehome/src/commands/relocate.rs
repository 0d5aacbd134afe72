use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tracing::debug;

use rehome_cli::RelocateArgs;
use rehome_fs::Simplified;
use rehome_patch::normalize_prefix;
use rehome_relocate::{RelocationRequest, Relocator};
use rehome_warnings::{warn_user, warn_user_once};

use crate::commands::reporters::RelocateReporter;
use crate::commands::{ExitStatus, count, elapsed};
use crate::prefix::{PREFIX_FILE, read_prefix, write_prefix};
use crate::printer::Printer;

/// Relocate an install root from its current prefix to a new one.
pub(crate) fn relocate(args: RelocateArgs, printer: Printer) -> Result<ExitStatus> {
    let start = Instant::now();
    let RelocateArgs {
        root,
        new_prefix,
        current_prefix,
        prefix_file,
        metadata_dir,
        dry_run,
    } = args;

    let root = fs_err::canonicalize(&root).context("Failed to locate the install root")?;
    let root = root.simplified().to_path_buf();
    let prefix_file = prefix_file.unwrap_or_else(|| root.join(PREFIX_FILE));

    let recorded = read_prefix(&prefix_file)?;
    let current = match (current_prefix, recorded.as_deref()) {
        (Some(current), Some(recorded)) => {
            if current != recorded {
                warn_user_once!(
                    "Ignoring the prefix `{recorded}` recorded in `{}` in favor of `--current-prefix`",
                    prefix_file.user_display()
                );
            }
            current
        }
        (Some(current), None) => current,
        (None, Some(recorded)) => recorded.to_string(),
        (None, None) => bail!(
            "No prefix is recorded in `{}`; pass `--current-prefix` with the prefix the install is located at",
            prefix_file.user_display()
        ),
    };

    let new = match new_prefix {
        Some(new) => new,
        None => root
            .to_str()
            .with_context(|| {
                format!(
                    "The install root `{}` is not valid UTF-8; pass `--new-prefix` instead",
                    root.user_display()
                )
            })?
            .to_string(),
    };

    // Compare and record prefixes in the form in which they are written into files.
    let current = normalize_prefix(&current).into_owned();
    let new = normalize_prefix(&new).into_owned();

    if current == new {
        if !dry_run && recorded.as_deref() != Some(new.as_str()) {
            write_prefix(&prefix_file, &new)?;
        }
        writeln!(
            printer.stderr(),
            "{}",
            format!("Install is already located at {}", new.cyan()).dimmed()
        )?;
        return Ok(ExitStatus::Success);
    }

    debug!("Relocating `{}` from `{current}` to `{new}`", root.user_display());

    let mut request = RelocationRequest::new(root.clone(), current, new);
    if let Some(metadata_dir) = metadata_dir {
        request = request.with_metadata_dir(metadata_dir);
    }

    let reporter = RelocateReporter::from(printer).with_dry_run(dry_run);
    let summary = Relocator::new(&request)
        .with_reporter(Arc::new(reporter))
        .with_dry_run(dry_run)
        .relocate()
        .with_context(|| format!("Failed to relocate `{}`", root.user_display()))?;

    if dry_run {
        return Ok(if summary.is_success() {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        });
    }

    // Without a complete relocation, the old prefix still has to be replaced on the next run.
    if summary.is_success() {
        write_prefix(&prefix_file, &request.new_placeholder)?;
    } else {
        warn_user!(
            "{} could not be relocated; the recorded prefix was left at `{}`",
            count(summary.failed, "file"),
            request.current_placeholder
        );
    }

    let details = [
        (summary.unchanged, "unchanged"),
        (summary.skipped, "skipped"),
        (summary.failed, "failed"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect::<Vec<_>>();

    let mut message = format!(
        "Relocated {} from {} to {} {}",
        count(summary.rewritten, "file").bold(),
        request.current_placeholder.cyan(),
        request.new_placeholder.cyan(),
        format!("in {}", elapsed(start.elapsed())).dimmed()
    );
    if !details.is_empty() {
        write!(message, " ({})", details.join(", "))?;
    }
    writeln!(printer.stderr(), "{message}")?;

    if summary.is_success() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
