// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::path::Path;

use assert_fs::TempDir;
use assert_fs::fixture::{ChildPath, FileWriteBin, FileWriteStr, PathChild};
use memchr::memmem;
use serde_json::json;

/// The placeholder packages are built with: 80 bytes reserved in every binary field.
pub const ORIGINAL_PLACEHOLDER: &str = concat!(
    "/opt/anaconda1anaconda2anaconda3",
    "_placehold_placehold_placehold_placehold",
    "_placeho"
);

/// The prefix the fixture tree is currently installed at.
pub const CURRENT_PREFIX: &str = "/opt/old";

/// The number of [`CURRENT_PREFIX`] occurrences in the fixture text file.
pub const TEXT_OCCURRENCES: usize = 10;

/// The number of placeholder fields in the fixture binary file.
pub const BINARY_OCCURRENCES: usize = 23;

/// Count the non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &[u8], needle: impl AsRef<[u8]>) -> usize {
    memmem::find_iter(haystack, needle.as_ref()).count()
}

/// Lines of random letters, `occurrences` of which embed `placeholder`.
pub fn random_text(rng: &mut fastrand::Rng, placeholder: &str, occurrences: usize) -> String {
    let mut lines = (0..2000)
        .map(|_| {
            (0..rng.usize(40..120))
                .map(|_| rng.alphabetic())
                .collect::<String>()
        })
        .collect::<Vec<_>>();

    let mut indices = (0..lines.len()).collect::<Vec<_>>();
    rng.shuffle(&mut indices);
    for &index in &indices[..occurrences] {
        let position = rng.usize(0..=lines[index].len());
        lines[index].insert_str(position, placeholder);
    }

    lines.join("\n")
}

/// Random non-ASCII bytes with scattered nulls, with `occurrences` fields holding `current`
/// padded to the width of `original`.
pub fn random_binary(
    rng: &mut fastrand::Rng,
    original: &str,
    current: &str,
    occurrences: usize,
) -> Vec<u8> {
    let slot = original.len() + 280;
    let mut data = (0..slot * (occurrences + 1))
        .map(|_| if rng.u8(..) < 16 { 0 } else { rng.u8(0x80..) })
        .collect::<Vec<_>>();

    let mut field = current.as_bytes().to_vec();
    field.resize(original.len() + 1, 0);
    for index in 0..occurrences {
        let position = index * slot + 7;
        data[position..position + field.len()].copy_from_slice(&field);
    }
    data
}

/// An install root with a `conda-meta` directory, removed on drop.
pub struct InstallTree {
    pub temp: TempDir,
}

impl InstallTree {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    /// A tree installed at [`CURRENT_PREFIX`] with one package: a text file, a binary file, an
    /// inert file without placeholder, and a file that is listed but missing from disk.
    pub fn installed() -> anyhow::Result<Self> {
        let tree = Self::new()?;
        let mut rng = fastrand::Rng::with_seed(23);

        tree.child("share/textfile.txt").write_str(&random_text(
            &mut rng,
            CURRENT_PREFIX,
            TEXT_OCCURRENCES,
        ))?;
        tree.child("lib/binfile.bin").write_binary(&random_binary(
            &mut rng,
            ORIGINAL_PLACEHOLDER,
            CURRENT_PREFIX,
            BINARY_OCCURRENCES,
        ))?;
        tree.child("share/README").write_str(CURRENT_PREFIX)?;

        tree.write_manifest(
            "test_spec-1.0-0.json",
            &json!([
                {
                    "_path": "share/textfile.txt",
                    "path_type": "hardlink",
                    "file_mode": "text",
                    "prefix_placeholder": "/opt/anaconda1anaconda2anaconda3"
                },
                {
                    "_path": "lib/binfile.bin",
                    "path_type": "hardlink",
                    "file_mode": "binary",
                    "prefix_placeholder": ORIGINAL_PLACEHOLDER
                },
                {
                    "_path": "share/README",
                    "path_type": "hardlink"
                },
                {
                    "_path": "bin/removed",
                    "path_type": "hardlink",
                    "file_mode": "text",
                    "prefix_placeholder": "/opt/anaconda1anaconda2anaconda3"
                }
            ]),
        )?;

        Ok(tree)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn child(&self, path: impl AsRef<Path>) -> ChildPath {
        self.temp.child(path)
    }

    /// Write a manifest named `name` into `conda-meta` with the given `paths_data.paths` records.
    pub fn write_manifest(
        &self,
        name: &str,
        paths: &serde_json::Value,
    ) -> anyhow::Result<ChildPath> {
        let manifest = self.child("conda-meta").child(name);
        let (package, version) = name
            .trim_end_matches(".json")
            .split_once('-')
            .unwrap_or((name, "0"));
        manifest.write_str(&serde_json::to_string_pretty(&json!({
            "name": package,
            "version": version,
            "paths_data": {
                "paths_version": 1,
                "paths": paths
            }
        }))?)?;
        Ok(manifest)
    }
}
