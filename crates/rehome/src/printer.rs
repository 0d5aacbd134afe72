use std::fmt;

use anstream::{eprint, print};

/// Routes the user-facing output of a command according to `--quiet` and `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Printer {
    /// Results on stdout, status messages on stderr.
    Default,
    /// No output besides warnings and errors.
    Quiet,
    /// Like [`Printer::Default`], and additionally reports every file that is relocated.
    Verbose,
}

impl Printer {
    /// The [`Stream`] for the results of a command, e.g., the plan of a `--dry-run`.
    pub(crate) fn stdout(self) -> Stream {
        match self {
            Self::Default | Self::Verbose => Stream::Stdout,
            Self::Quiet => Stream::Hidden,
        }
    }

    /// The [`Stream`] for status messages, e.g., the summary of a relocation.
    pub(crate) fn stderr(self) -> Stream {
        match self {
            Self::Default | Self::Verbose => Stream::Stderr,
            Self::Quiet => Stream::Hidden,
        }
    }

    /// The [`Stream`] for the status of individual files, which is only shown in verbose mode.
    pub(crate) fn files(self) -> Stream {
        match self {
            Self::Verbose => Stream::Stderr,
            Self::Default | Self::Quiet => Stream::Hidden,
        }
    }
}

/// A standard stream, or a sink that discards everything written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
    Hidden,
}

impl fmt::Write for Stream {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self {
            Self::Stdout => print!("{s}"),
            Self::Stderr => eprint!("{s}"),
            Self::Hidden => {}
        }
        Ok(())
    }
}
