//! Rewrite embedded installation prefixes in place.
//!
//! Files in a relocatable package contain a placeholder path that was reserved at build time. In
//! text files the placeholder can be substituted freely; in binary files it lives in a fixed-width,
//! null-padded field, so every rewrite has to preserve the total length of the file.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use rehome_fs::Simplified;

pub use binary::binary_replace;
pub use mode::FileMode;
pub use text::text_replace;
pub use update::{Outcome, check_prefix, normalize_prefix, update_prefix};

mod binary;
mod mode;
mod text;
mod update;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(
        "New placeholder `{new}` ({} bytes) is longer than the original placeholder `{original}` ({} bytes)",
        new.len(),
        original.len()
    )]
    PlaceholderTooLong { original: String, new: String },
    #[error(
        "Current placeholder `{current}` ({} bytes) exceeds the capacity of the original placeholder `{original}` ({} bytes)",
        current.len(),
        original.len()
    )]
    CapacityExceeded { original: String, current: String },
    #[error("The current placeholder must not be empty")]
    EmptyPlaceholder,
    #[error(
        "Replacement at byte offset {offset} does not fit in its null-padded field of {capacity} bytes"
    )]
    PaddingOverflow { offset: usize, capacity: usize },
    #[error(
        "Failed to replace `{}` after {attempts} attempts; the file is held open by another process",
        path.user_display()
    )]
    RetriesExhausted {
        path: PathBuf,
        attempts: usize,
        #[source]
        err: io::Error,
    },
}
