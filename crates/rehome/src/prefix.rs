//! The prefix marker: a file in the install root recording the prefix the install was last
//! relocated to, such that the next relocation knows which prefix to replace.

use std::io;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use rehome_fs::Simplified;

/// The name of the prefix marker in the install root.
pub(crate) const PREFIX_FILE: &str = ".rehome-prefix";

/// Read the prefix recorded in the marker at `path`.
///
/// Returns `None` if the marker doesn't exist or is empty.
pub(crate) fn read_prefix(path: &Path) -> anyhow::Result<Option<String>> {
    match fs_err::read_to_string(path) {
        Ok(contents) => {
            let prefix = contents.trim_end();
            if prefix.is_empty() {
                debug!("Ignoring empty prefix file: `{}`", path.user_display());
                Ok(None)
            } else {
                debug!("Found prefix `{prefix}` in `{}`", path.user_display());
                Ok(Some(prefix.to_string()))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).context("Failed to read the prefix file"),
    }
}

/// Record `prefix` in the marker at `path`, replacing the marker atomically.
pub(crate) fn write_prefix(path: &Path, prefix: &str) -> anyhow::Result<()> {
    rehome_fs::write_atomic_sync(path, prefix).with_context(|| {
        format!(
            "Failed to record the new prefix in `{}`",
            path.user_display()
        )
    })?;
    debug!("Recorded prefix `{prefix}` in `{}`", path.user_display());
    Ok(())
}
