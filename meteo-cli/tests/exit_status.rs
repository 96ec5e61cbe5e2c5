use std::{fs, process::Command};

use tempfile::TempDir;

fn meteo(config: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_meteo"))
        .args(args)
        .env("METEO_CONFIG_PATH", config)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn invalid_latitude_exits_non_zero_with_one_line() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    fs::write(&config, "common:\n  longitude: 0.0\n").unwrap();

    let out = meteo(&config, &["--lat", "100"]);

    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr.lines().count(), 1, "{stderr}");
    assert!(stderr.starts_with("Error: invalid latitude 100"), "{stderr}");
}

#[test]
fn missing_explicit_config_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let out = meteo(&dir.path().join("absent.yaml"), &["--lat", "1", "--lon", "2"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("config file not found"));
}

#[test]
fn set_creates_the_named_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("fresh.yaml");

    let out = meteo(&config, &["set", "api", "meteoblue"]);

    assert!(out.status.success());
    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("default-api: meteoblue"), "{saved}");
}
