use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use capture_replay::{
    CallIdentity, CaptureStore, DataMapper, DirectoryCaptureStore, JsonDataMapper, Mode,
};
use predicates::prelude::*;
use tempfile::TempDir;

use super::common::fixtures::advice_over;

fn capture_replay_command() -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("capture-replay")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

fn seed_captures(dir: &Path) -> Result<()> {
    let store = Arc::new(DirectoryCaptureStore::new(dir.to_string_lossy())?);
    let advice = advice_over(store, Mode::Capture, Default::default());
    advice.around(&CallIdentity::new("getString"), || "captured text".to_string())?;
    advice.around(
        &CallIdentity::new("convert").arg("EUR")?.null(),
        || vec![1u32, 2, 3],
    )?;
    Ok(())
}

#[test]
fn test_list_prints_sorted_keys() -> Result<()> {
    let dir = TempDir::new()?;
    seed_captures(dir.path())?;
    let convert = CallIdentity::new("convert").arg("EUR")?.null().capture_key();

    capture_replay_command()?
        .arg("list")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(format!("{convert}\ngetString\n"));
    Ok(())
}

#[test]
fn test_list_of_missing_directory_is_empty() -> Result<()> {
    let dir = TempDir::new()?;
    capture_replay_command()?
        .args(["list", "-d"])
        .arg(dir.path().join("never-created"))
        .assert()
        .success()
        .stdout("");
    Ok(())
}

#[test]
fn test_show_prints_type_and_value() -> Result<()> {
    let dir = TempDir::new()?;
    seed_captures(dir.path())?;

    capture_replay_command()?
        .args(["show", "getString", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "type: {}",
            std::any::type_name::<String>()
        )))
        .stdout(predicate::str::contains("\"captured text\""));
    Ok(())
}

#[test]
fn test_show_missing_key_fails() -> Result<()> {
    let dir = TempDir::new()?;
    capture_replay_command()?
        .args(["show", "nothingHere", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No capture record"));
    Ok(())
}

#[test]
fn test_show_rejects_non_record_file() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("garbage.json"), "not json")?;
    capture_replay_command()?
        .args(["show", "garbage", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a capture record"));
    Ok(())
}

#[test]
fn test_key_matches_library_derivation() -> Result<()> {
    let expected = CallIdentity::new("convert")
        .arg("EUR")?
        .null()
        .arg(&42)?
        .capture_key();

    capture_replay_command()?
        .args(["key", "convert", "EUR", "null", "42"])
        .assert()
        .success()
        .stdout(format!("{expected}\n"));

    // A quoted JSON string and a bare word are the same argument.
    capture_replay_command()?
        .args(["key", "convert", "\"EUR\"", "null", "42"])
        .assert()
        .success()
        .stdout(format!("{expected}\n"));
    Ok(())
}

#[test]
fn test_purge_removes_captures() -> Result<()> {
    let dir = TempDir::new()?;
    seed_captures(dir.path())?;
    fs::write(dir.path().join("README.txt"), "keep me")?;

    capture_replay_command()?
        .args(["purge", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout("removed 2 capture file(s)\n");

    let store = DirectoryCaptureStore::new(dir.path().to_string_lossy())?;
    assert!(store.keys()?.is_empty());
    assert!(store.existing_slot("getString").is_err());
    assert!(dir.path().join("README.txt").is_file());
    Ok(())
}

#[test]
fn test_custom_extension() -> Result<()> {
    let dir = TempDir::new()?;
    let store = Arc::new(DirectoryCaptureStore::with_extension(
        dir.path().to_string_lossy(),
        ".cap",
    )?);
    let mapper: Arc<dyn DataMapper> = Arc::new(JsonDataMapper::new(store));
    mapper.write_value(&CallIdentity::new("ping"), &true)?;

    capture_replay_command()?
        .args(["list", "-e", ".cap", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout("ping\n");
    Ok(())
}

#[test]
fn test_unknown_subcommand_fails() -> Result<()> {
    capture_replay_command()?
        .arg("record")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
    Ok(())
}

#[test]
fn test_config_reports_file_settings() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("capture-replay.toml");
    fs::write(
        &file,
        "mode = \"Capture\"\n[store]\npath = \"/srv/captures\"\n[mapper]\npretty = false\n",
    )?;

    capture_replay_command()?
        .env_remove("CAPTURE_REPLAY_MODE")
        .args(["config", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("mode: capture\nstore: directory /srv/captures (.json)\npretty: false\n");
    Ok(())
}

#[test]
fn test_config_mode_comes_from_environment() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("capture-replay.toml");
    fs::write(&file, "mode = \"capture\"\n[store]\nkind = \"temporary\"\n")?;

    capture_replay_command()?
        .env("CAPTURE_REPLAY_MODE", "REPLAY")
        .args(["config", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stdout("mode: replay\nstore: temporary\npretty: true\n");

    capture_replay_command()?
        .env("CAPTURE_REPLAY_MODE", "off")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mode: off\n"));
    Ok(())
}

#[test]
fn test_config_rejects_unknown_environment_mode() -> Result<()> {
    capture_replay_command()?
        .env("CAPTURE_REPLAY_MODE", "sideways")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid CAPTURE_REPLAY_MODE"));
    Ok(())
}
