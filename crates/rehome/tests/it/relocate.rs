use anyhow::Result;
use assert_cmd::assert::OutputAssertExt;
use assert_fs::prelude::*;
use predicates::prelude::*;

use rehome_static::EnvVars;
use rehome_test::{BINARY_OCCURRENCES, CURRENT_PREFIX, TEXT_OCCURRENCES, count};

use crate::common::TestContext;

#[test]
fn relocate_to_install_root() -> Result<()> {
    let context = TestContext::new()?;
    let root = context.root_str();
    let binary_before = fs_err::read(context.tree.child("lib/binfile.bin"))?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Relocated 2 files from {CURRENT_PREFIX} to {root} in"
        )))
        .stderr(predicate::str::contains("(1 skipped)"))
        .stderr(predicate::str::contains(
            "warning: Skipping `",
        ))
        .stderr(predicate::str::contains("bin/removed"));

    let text = fs_err::read(context.tree.child("share/textfile.txt"))?;
    assert_eq!(count(&text, &root), TEXT_OCCURRENCES);
    assert_eq!(count(&text, CURRENT_PREFIX), 0);

    let binary = fs_err::read(context.tree.child("lib/binfile.bin"))?;
    assert_eq!(binary.len(), binary_before.len());
    assert_eq!(count(&binary, &root), BINARY_OCCURRENCES);
    assert_eq!(count(&binary, CURRENT_PREFIX), 0);

    context.tree.child(".rehome-prefix").assert(root);
    Ok(())
}

#[test]
fn relocate_from_recorded_prefix() -> Result<()> {
    let context = TestContext::new()?;
    context.tree.child(".rehome-prefix").write_str("/opt/old\n")?;

    context
        .command()
        .arg("--new-prefix")
        .arg("/srv/moved")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Relocated 2 files from /opt/old to /srv/moved",
        ));

    let text = fs_err::read(context.tree.child("share/textfile.txt"))?;
    assert_eq!(count(&text, "/srv/moved"), TEXT_OCCURRENCES);
    context.tree.child(".rehome-prefix").assert("/srv/moved");

    // The second relocation starts from the prefix recorded by the first.
    context
        .command()
        .env(EnvVars::REHOME_NEW_PREFIX, "/srv/moved/again")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Relocated 2 files from /srv/moved to /srv/moved/again",
        ));

    let binary = fs_err::read(context.tree.child("lib/binfile.bin"))?;
    assert_eq!(count(&binary, "/srv/moved/again"), BINARY_OCCURRENCES);
    context.tree.child(".rehome-prefix").assert("/srv/moved/again");
    Ok(())
}

#[test]
fn custom_prefix_file() -> Result<()> {
    let context = TestContext::new()?;
    let marker = context.tree.child("state/prefix");
    marker.write_str(CURRENT_PREFIX)?;

    context
        .command()
        .env(EnvVars::REHOME_PREFIX_FILE, marker.path())
        .arg("--new-prefix")
        .arg("/srv/moved")
        .assert()
        .success();

    marker.assert("/srv/moved");
    context
        .tree
        .child(".rehome-prefix")
        .assert(predicate::path::missing());
    Ok(())
}

#[test]
fn missing_current_prefix() -> Result<()> {
    let context = TestContext::new()?;
    let text_before = fs_err::read(context.tree.child("share/textfile.txt"))?;

    context
        .command()
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("error: No prefix is recorded in"))
        .stderr(predicate::str::contains("--current-prefix"));

    assert_eq!(
        fs_err::read(context.tree.child("share/textfile.txt"))?,
        text_before
    );
    Ok(())
}

#[test]
fn already_at_prefix() -> Result<()> {
    let context = TestContext::new()?;
    let marker = context.tree.child(".rehome-prefix");
    marker.write_str(&context.root_str())?;

    context
        .command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Install is already located at"));
    Ok(())
}

#[test]
fn dry_run() -> Result<()> {
    let context = TestContext::new()?;
    let text_before = fs_err::read(context.tree.child("share/textfile.txt"))?;
    let binary_before = fs_err::read(context.tree.child("lib/binfile.bin"))?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("test_spec-1.0-0.json (3 files)"))
        .stdout(predicate::str::contains(" rewrite "))
        .stdout(predicate::str::contains(" missing "))
        .stdout(predicate::str::contains(
            "Would relocate 2 files from 1 manifest",
        ));

    assert_eq!(
        fs_err::read(context.tree.child("share/textfile.txt"))?,
        text_before
    );
    assert_eq!(
        fs_err::read(context.tree.child("lib/binfile.bin"))?,
        binary_before
    );
    context
        .tree
        .child(".rehome-prefix")
        .assert(predicate::path::missing());
    Ok(())
}

#[test]
fn oversized_prefix_keeps_marker() -> Result<()> {
    let context = TestContext::new()?;
    let marker = context.tree.child(".rehome-prefix");
    marker.write_str(CURRENT_PREFIX)?;
    let new = format!("/{}", "x".repeat(100));

    context
        .command()
        .arg("--new-prefix")
        .arg(&new)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("warning: Failed to relocate `"))
        .stderr(predicate::str::contains(
            "is longer than the original placeholder",
        ))
        .stderr(predicate::str::contains("(1 skipped, 1 failed)"));

    // The text file was relocated regardless, but the marker still points at the old prefix.
    let text = fs_err::read(context.tree.child("share/textfile.txt"))?;
    assert_eq!(count(&text, &new), TEXT_OCCURRENCES);
    marker.assert(CURRENT_PREFIX);
    Ok(())
}

#[test]
fn malformed_manifest() -> Result<()> {
    let context = TestContext::new()?;
    context
        .tree
        .child("conda-meta/broken-1.0-0.json")
        .write_str("{\"paths_data\": ")?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("error: Failed to relocate `"))
        .stderr(predicate::str::contains(
            "Caused by: Failed to read manifest: `",
        ))
        .stderr(predicate::str::contains(
            "Caused by: Manifest is not valid JSON",
        ));

    context
        .tree
        .child(".rehome-prefix")
        .assert(predicate::path::missing());
    Ok(())
}

#[test]
fn missing_metadata_dir() -> Result<()> {
    let context = TestContext::new()?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--metadata-dir")
        .arg(context.tree.child("meta").path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Caused by: Metadata directory does not exist",
        ));
    Ok(())
}

#[test]
fn quiet() -> Result<()> {
    let context = TestContext::new()?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());

    context.tree.child(".rehome-prefix").assert(context.root_str());
    Ok(())
}

#[test]
fn verbose_lists_files() -> Result<()> {
    let context = TestContext::new()?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("Rewrote "))
        .stderr(predicate::str::contains("share/textfile.txt"))
        .stderr(predicate::str::contains("lib/binfile.bin"))
        .stderr(predicate::str::contains("Unchanged "))
        .stderr(predicate::str::contains("Relocated 2 files from"));
    Ok(())
}

#[test]
fn default_output_omits_files() -> Result<()> {
    let context = TestContext::new()?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .assert()
        .success()
        .stderr(predicate::str::contains("Rewrote").not())
        .stderr(predicate::str::contains("Relocated 2 files from"));
    Ok(())
}

#[test]
fn rerun_into_prefix_containing_current() -> Result<()> {
    let context = TestContext::new()?;
    let new = format!("{CURRENT_PREFIX}-v2");

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--new-prefix")
        .arg(&new)
        .assert()
        .success();
    let text = fs_err::read(context.tree.child("share/textfile.txt"))?;

    // Re-running with the old prefix, as after a partial failure, leaves the files as they are.
    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--new-prefix")
        .arg(&new)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Relocated 0 files from {CURRENT_PREFIX} to {new}"
        )));

    assert_eq!(fs_err::read(context.tree.child("share/textfile.txt"))?, text);
    assert_eq!(count(&text, &new), TEXT_OCCURRENCES);
    context.tree.child(".rehome-prefix").assert(new.as_str());
    Ok(())
}

#[test]
#[cfg(windows)]
fn marker_records_forward_slashes() -> Result<()> {
    let context = TestContext::new()?;

    context
        .command()
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .arg("--new-prefix")
        .arg(r"C:\srv\relocated")
        .assert()
        .success();

    context.tree.child(".rehome-prefix").assert("C:/srv/relocated");
    Ok(())
}

#[test]
fn missing_root() {
    let temp = assert_fs::TempDir::new().unwrap();

    std::process::Command::new(crate::common::get_bin())
        .arg(temp.child("missing").path())
        .arg("--current-prefix")
        .arg(CURRENT_PREFIX)
        .env_remove(EnvVars::REHOME_PREFIX_FILE)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "error: Failed to locate the install root",
        ));
}
