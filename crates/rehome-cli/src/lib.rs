use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Args, Parser};

use rehome_static::EnvVars;

// Configures Clap v3-style help menu colors
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "rehome", author, version)]
#[command(about = "Relocate an installed package tree to a new prefix.")]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(flatten)]
    pub relocate: RelocateArgs,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Args)]
pub struct RelocateArgs {
    /// The root of the install to relocate.
    ///
    /// Must contain the package manifests in `conda-meta/`, unless `--metadata-dir` is given.
    pub root: PathBuf,

    /// The prefix to relocate the install to.
    ///
    /// Defaults to the absolute path of the install root. In binary files, the new prefix can't
    /// be longer than the placeholder the package was built with.
    #[arg(long, env = EnvVars::REHOME_NEW_PREFIX, value_name = "PREFIX")]
    pub new_prefix: Option<String>,

    /// The prefix the install is currently located at.
    ///
    /// Defaults to the prefix recorded in the prefix file by the previous relocation.
    #[arg(long, env = EnvVars::REHOME_CURRENT_PREFIX, value_name = "PREFIX")]
    pub current_prefix: Option<String>,

    /// The file recording the prefix of the previous relocation.
    ///
    /// Defaults to `.rehome-prefix` in the install root.
    #[arg(long, env = EnvVars::REHOME_PREFIX_FILE, value_name = "FILE")]
    pub prefix_file: Option<PathBuf>,

    /// The directory containing the package manifests.
    ///
    /// Defaults to `conda-meta` in the install root.
    #[arg(long, env = EnvVars::REHOME_METADATA_DIR, value_name = "DIR")]
    pub metadata_dir: Option<PathBuf>,

    /// Show the files that would be relocated, without modifying any of them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
#[command(next_help_heading = "Global options")]
pub struct GlobalArgs {
    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use verbose output.
    ///
    /// You can configure fine-grained logging using the `RUST_LOG` environment variable.
    /// (<https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives>)
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Disable colors.
    #[arg(global = true, long, hide = true, conflicts_with = "color")]
    pub no_color: bool,

    /// Control colors in output.
    #[arg(
        global = true,
        long,
        value_enum,
        default_value = "auto",
        conflicts_with = "no_color",
        value_name = "COLOR_CHOICE"
    )]
    pub color: ColorChoice,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Enables colored output only when the output is going to a terminal or TTY with support.
    Auto,

    /// Enables colored output regardless of the detected environment.
    Always,

    /// Disables colored output.
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}
