use std::fs;

use capture_replay::config::StoreConfig;
use capture_replay::{wire, CallIdentity, Config, Interceptor, Mode, TypeRegistry};
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("capture-replay.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_config_file_drives_capture_then_replay() {
    let dir = tempdir().unwrap();
    let captures = dir.path().join("captures");
    let path = write_config(
        dir.path(),
        &format!(
            "mode = \"capture\"\n\n[store]\npath = {:?}\n\n[mapper]\npretty = false\n",
            captures.to_string_lossy()
        ),
    );

    let config = Config::load(&path).unwrap();
    let interceptor = Interceptor::from_wiring(wire(&config, TypeRegistry::new()).unwrap());
    assert!(interceptor.is_installed());

    let call = CallIdentity::new("exchangeRate").arg("EUR").unwrap();
    let captured: f64 = interceptor.call(&call, || 1.0875).unwrap();
    assert_eq!(captured, 1.0875);

    let file = fs::read_dir(&captures)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .next()
        .unwrap();
    let contents = fs::read_to_string(&file).unwrap();
    assert!(!contents.contains('\n'), "compact output expected: {contents}");

    let replay_config = Config::load(&path)
        .unwrap()
        .with_mode_override(Some("REPLAY"))
        .unwrap();
    let replay = Interceptor::from_wiring(wire(&replay_config, TypeRegistry::new()).unwrap());
    let replayed: f64 = replay.call(&call, || 0.0).unwrap();
    assert_eq!(replayed, 1.0875);
}

#[test]
fn test_off_means_plain_calls() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "mode = \"OFF\"\n");

    let config = Config::load(&path).unwrap();
    let advice = wire(&config, TypeRegistry::new()).unwrap();
    assert!(advice.is_none());

    let interceptor = Interceptor::from_wiring(advice);
    let mut calls = 0;
    for _ in 0..3 {
        interceptor
            .call(&CallIdentity::new("tick"), || {
                calls += 1;
                calls
            })
            .unwrap();
    }
    assert_eq!(calls, 3);
}

#[test]
fn test_temporary_store_from_config() {
    let config = Config::from_toml_str("mode = \"disabled\"\n[store]\nkind = \"temporary\"\n")
        .unwrap();
    assert_eq!(config.store, StoreConfig::Temporary);

    let advice = wire(&config, TypeRegistry::new()).unwrap().unwrap();
    assert_eq!(advice.mode(), Mode::Disabled);

    advice.set_mode(Mode::Capture).unwrap();
    advice
        .around(&CallIdentity::new("answer"), || 42u32)
        .unwrap();
    advice.set_mode(Mode::Replay).unwrap();
    assert_eq!(
        advice
            .around(&CallIdentity::new("answer"), || 0u32)
            .unwrap(),
        42
    );
}

#[test]
fn test_missing_mode_fails_wiring() {
    let config = Config::from_toml_str("[store]\nkind = \"temporary\"\n").unwrap();
    let err = wire(&config, TypeRegistry::new()).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("no mode"));
}
