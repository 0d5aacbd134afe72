use std::borrow::Cow;
use std::io;
use std::path::Path;

use tracing::{debug, instrument, trace};

use rehome_fs::Simplified;

use crate::{Error, FileMode, binary_replace, text_replace};

/// The result of rewriting a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file contained the current placeholder and was replaced.
    Rewritten,
    /// The file already had the desired contents and was left untouched.
    Unchanged,
}

/// Rewrite the placeholders in the file at `path` from `current` to `new`.
///
/// `original` is the placeholder the package was built with, and bounds the length of `new` in
/// [`FileMode::Binary`]. It is ignored in [`FileMode::Text`].
///
/// If the contents change, the new contents are written to a temporary file in the same directory
/// with the permissions of the existing file, which is then renamed over it. The file is never
/// modified in place, since it may be memory-mapped by a running process. If the contents are
/// unchanged, the file isn't touched at all.
#[instrument(skip_all, fields(path = %path.as_ref().user_display(), %mode))]
pub fn update_prefix(
    path: impl AsRef<Path>,
    original: &str,
    current: &str,
    new: &str,
    mode: FileMode,
) -> Result<Outcome, Error> {
    // Rewrite the target of a symlink rather than replacing the link itself.
    let path = fs_err::canonicalize(path.as_ref())?;

    let Some(contents) = replaced_contents(&path, original, current, new, mode)? else {
        return Ok(Outcome::Unchanged);
    };

    let permissions = fs_err::metadata(&path)?.permissions();
    let Some(parent) = path.parent() else {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot rewrite `{}` without a parent", path.user_display()),
        )));
    };

    let temp_file = rehome_fs::tempfile_in(parent)?;
    fs_err::write(&temp_file, &contents)?;
    temp_file.as_file().set_permissions(permissions)?;

    rehome_fs::persist_with_retry_sync(temp_file, &path)
        .map_err(|err| persist_error(&path, err))?;

    debug!("Rewrote {mode} placeholders in `{}`", path.user_display());
    Ok(Outcome::Rewritten)
}

/// A transient error that survived every retry means the file is held open by another process.
fn persist_error(path: &Path, err: io::Error) -> Error {
    if rehome_fs::is_transient(&err) {
        Error::RetriesExhausted {
            path: path.to_path_buf(),
            attempts: rehome_fs::MAX_ATTEMPTS,
            err,
        }
    } else {
        Error::Io(err)
    }
}

/// Normalize a prefix to the form in which it is written into files.
///
/// On Windows, prefixes use forward slashes, to avoid having to escape backslashes in the
/// rewritten contents. Elsewhere, prefixes are returned unchanged.
pub fn normalize_prefix(prefix: &str) -> Cow<'_, str> {
    if cfg!(windows) {
        Cow::Owned(prefix.replace('\\', "/"))
    } else {
        Cow::Borrowed(prefix)
    }
}

/// Determine the [`Outcome`] [`update_prefix`] would have, without modifying the file.
///
/// Fails with the same errors as [`update_prefix`], except for those raised while writing.
pub fn check_prefix(
    path: impl AsRef<Path>,
    original: &str,
    current: &str,
    new: &str,
    mode: FileMode,
) -> Result<Outcome, Error> {
    let path = fs_err::canonicalize(path.as_ref())?;
    match replaced_contents(&path, original, current, new, mode)? {
        Some(_) => Ok(Outcome::Rewritten),
        None => Ok(Outcome::Unchanged),
    }
}

/// Read the file at `path` and replace its placeholders, returning `None` if nothing changed.
fn replaced_contents(
    path: &Path,
    original: &str,
    current: &str,
    new: &str,
    mode: FileMode,
) -> Result<Option<Vec<u8>>, Error> {
    let current = normalize_prefix(current);
    let new = normalize_prefix(new);

    let data = fs_err::read(path)?;
    let contents = match mode {
        FileMode::Text => text_replace(&data, &current, &new),
        FileMode::Binary => {
            if cfg!(windows) {
                // Packages are never built with binary placeholders on Windows, and rewriting one
                // would break the package anyway.
                debug!(
                    "Skipping binary placeholder in `{}` on Windows",
                    path.user_display()
                );
                return Ok(None);
            }
            Cow::Owned(binary_replace(&data, original, &current, &new)?)
        }
    };

    if *contents == *data {
        trace!("No placeholder to replace in `{}`", path.user_display());
        return Ok(None);
    }
    Ok(Some(contents.into_owned()))
}
