use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use rehome_cli::Cli;

use crate::commands::ExitStatus;
use crate::printer::{Printer, Stream};

mod commands;
mod logging;
mod prefix;
mod printer;

fn run() -> Result<ExitStatus> {
    let cli = Cli::parse();
    let globals = cli.global_args;

    if globals.no_color {
        anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
    } else {
        anstream::ColorChoice::write_global(globals.color.into());
    }

    // Configure the `tracing` crate, which controls internal logging.
    logging::setup_logging(match globals.verbose {
        0 => logging::Level::Default,
        1 => logging::Level::Verbose,
        _ => logging::Level::ExtraVerbose,
    })?;

    // Configure the `Printer`, which controls user-facing output in the CLI.
    let printer = if globals.quiet {
        Printer::Quiet
    } else if globals.verbose > 0 {
        Printer::Verbose
    } else {
        Printer::Default
    };

    // Configure the `warn_user!` macros, which control user-facing warnings in the CLI.
    if !globals.quiet {
        rehome_warnings::enable();
    }

    commands::relocate(cli.relocate, printer)
}

fn main() -> ExitCode {
    match run() {
        Ok(status) => status.into(),
        Err(err) => {
            // Errors are shown even with `--quiet`.
            let _ = rehome_warnings::write_error_chain(&*err, Stream::Stderr);
            ExitStatus::Error.into()
        }
    }
}
