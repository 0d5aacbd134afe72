use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use tempfile::NamedTempFile;
use tracing::warn;

pub use crate::path::*;

mod path;

/// The number of attempts made for a file operation that fails with a transient error, including
/// the first one.
pub const MAX_ATTEMPTS: usize = 6;

/// Return the backoff policy for file moves: `100ms`, doubling after every failed
/// attempt, for at most [`MAX_ATTEMPTS`] attempts (about 3 seconds of sleeping in total).
fn backoff_file_move() -> ExponentialBuilder {
    backoff(Duration::from_millis(100))
}

fn backoff(min_delay: Duration) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(min_delay)
        .with_factor(2.0)
        .with_max_times(MAX_ATTEMPTS - 1)
}

/// Returns `true` if the error is likely caused by another process briefly holding the file,
/// such that retrying the operation may succeed.
///
/// On Windows, antivirus software and processes that map a DLL can lock files temporarily,
/// surfacing as `PermissionDenied`.
pub fn is_transient(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::ResourceBusy | io::ErrorKind::ExecutableFileBusy => true,
        io::ErrorKind::PermissionDenied => cfg!(windows),
        _ => false,
    }
}

/// Return a [`NamedTempFile`] in the specified directory.
///
/// Sets the permissions of the temporary file to `0o666`, to match the non-temporary file default.
/// ([`NamedTempFile`] defaults to `0o600`.)
#[cfg(unix)]
pub fn tempfile_in(path: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(path)
}

/// Return a [`NamedTempFile`] in the specified directory.
#[cfg(not(unix))]
pub fn tempfile_in(path: &Path) -> io::Result<NamedTempFile> {
    tempfile::Builder::new().tempfile_in(path)
}

/// Write `data` to `path` atomically using a temporary file and atomic rename.
pub fn write_atomic_sync(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Write path must have a parent: {}", path.user_display()),
        )
    })?;
    let temp_file = tempfile_in(parent)?;
    fs_err::write(&temp_file, &data)?;
    persist_with_retry_sync(temp_file, path)
}

/// Persist a [`NamedTempFile`] to `to` via an atomic rename, retrying if the rename fails due to
/// transient operating system errors.
///
/// The destination is replaced in a single step: readers observe either the previous file or the
/// new one, and processes that still map the previous file keep their pages intact.
pub fn persist_with_retry_sync(from: NamedTempFile, to: impl AsRef<Path>) -> io::Result<()> {
    let to = to.as_ref();
    let mut from = Some(from);

    let persist = || {
        let Some(file) = from.take() else {
            return Err(io::Error::other(
                "temporary file was lost between persist attempts",
            ));
        };
        match file.persist(to) {
            Ok(_) => Ok(()),
            Err(err) => {
                from = Some(err.file);
                Err(err.error)
            }
        }
    };

    retry_sync(persist, to).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!(
                "Failed to persist temporary file to {}: {err}",
                to.user_display()
            ),
        )
    })
}

/// Run a file `operation` on `path`, retrying with exponential backoff for as long as it fails
/// with a [transient](is_transient) error, up to [`MAX_ATTEMPTS`] attempts.
///
/// Returns the error of the last attempt once the attempts are exhausted.
pub fn retry_sync<T>(
    operation: impl FnMut() -> io::Result<T>,
    path: impl AsRef<Path>,
) -> io::Result<T> {
    retry_sync_with(operation, path.as_ref(), backoff_file_move())
}

fn retry_sync_with<T>(
    operation: impl FnMut() -> io::Result<T>,
    path: &Path,
    backoff: ExponentialBuilder,
) -> io::Result<T> {
    operation
        .retry(backoff)
        .sleep(std::thread::sleep)
        .when(is_transient)
        .notify(|err, delay| {
            warn!(
                "Retrying operation on `{}` in {delay:?} due to transient error: {err}",
                path.user_display()
            );
        })
        .call()
}

/// Iterate over the files in a directory.
///
/// If the directory does not exist, returns an empty iterator.
pub fn files(path: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
    path.as_ref()
        .read_dir()
        .ok()
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Failed to read entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .map(|entry| entry.path())
}
