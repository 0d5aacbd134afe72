/// Declares all environment variable used throughout `rehome` and its crates.
pub struct EnvVars;

impl EnvVars {
    /// Equivalent to the `--new-prefix` command-line argument. If set, rehome will rewrite
    /// placeholders to this prefix instead of the canonicalized install root.
    pub const REHOME_NEW_PREFIX: &'static str = "REHOME_NEW_PREFIX";

    /// Equivalent to the `--current-prefix` command-line argument. If set, rehome will treat this
    /// value as the prefix currently embedded in the installed files, ignoring the prefix marker.
    pub const REHOME_CURRENT_PREFIX: &'static str = "REHOME_CURRENT_PREFIX";

    /// Equivalent to the `--prefix-file` command-line argument. If set, rehome will read and
    /// update the prefix marker at this path rather than `<root>/.rehome-prefix`.
    pub const REHOME_PREFIX_FILE: &'static str = "REHOME_PREFIX_FILE";

    /// Equivalent to the `--metadata-dir` command-line argument. If set, rehome will read package
    /// manifests from this directory instead of `<root>/conda-meta`.
    pub const REHOME_METADATA_DIR: &'static str = "REHOME_METADATA_DIR";

    /// If set, rehome will use this value as the log level for its `--verbose` output. Accepts
    /// any filter compatible with the `tracing_subscriber` crate.
    pub const RUST_LOG: &'static str = "RUST_LOG";

    /// Disables colored output (takes precedence over `FORCE_COLOR`).
    ///
    /// See [no-color.org](https://no-color.org).
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Forces colored output regardless of terminal support.
    ///
    /// See [force-color.org](https://force-color.org).
    pub const FORCE_COLOR: &'static str = "FORCE_COLOR";
}
