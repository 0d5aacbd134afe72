// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::path::PathBuf;
use std::process::Command;

use rehome_static::EnvVars;
use rehome_test::InstallTree;

/// An [`InstallTree`] and the `rehome` binary to relocate it with.
pub struct TestContext {
    pub tree: InstallTree,
    /// The canonicalized install root, i.e., the default new prefix.
    pub root: PathBuf,
}

impl TestContext {
    /// A context for the fixture tree installed at [`rehome_test::CURRENT_PREFIX`].
    pub fn new() -> anyhow::Result<Self> {
        Self::with_tree(InstallTree::installed()?)
    }

    pub fn with_tree(tree: InstallTree) -> anyhow::Result<Self> {
        let root = fs_err::canonicalize(tree.root())?;
        Ok(Self { tree, root })
    }

    /// The canonicalized install root as a string.
    pub fn root_str(&self) -> String {
        self.root.to_string_lossy().to_string()
    }

    /// A `rehome` command for the install root, isolated from the environment of the test run.
    pub fn command(&self) -> Command {
        let mut command = Command::new(get_bin());
        command
            .arg(self.tree.root())
            .env_remove(EnvVars::REHOME_NEW_PREFIX)
            .env_remove(EnvVars::REHOME_CURRENT_PREFIX)
            .env_remove(EnvVars::REHOME_PREFIX_FILE)
            .env_remove(EnvVars::REHOME_METADATA_DIR)
            .env_remove(EnvVars::RUST_LOG)
            .env_remove(EnvVars::FORCE_COLOR)
            .env(EnvVars::NO_COLOR, "1");
        command
    }
}

/// Returns the rehome binary that cargo built before launching the tests.
pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rehome"))
}
