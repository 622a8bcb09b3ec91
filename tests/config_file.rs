//! Config file creation and loading.

use perceive::config::{load_or_create_at, save_config_at, Config, DebugLogRotation};
use tempfile::TempDir;

#[test]
fn test_creates_default_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let config = load_or_create_at(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.backend.base_url, "http://localhost:5001");
    assert_eq!(config.search.context_size, 2);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[backend]"));
    assert!(written.contains("base_url = \"http://localhost:5001\""));
}

#[test]
fn test_round_trip_keeps_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.debug = true;
    config.debug_log_rotation = Some(DebugLogRotation::None);
    config.backend.base_url = "http://search.lan:8080".to_string();
    config.search.context_size = 3;
    save_config_at(&config, &path).unwrap();

    let loaded = load_or_create_at(&path).unwrap();
    assert!(loaded.debug);
    assert_eq!(loaded.debug_log_rotation, Some(DebugLogRotation::None));
    assert_eq!(loaded.backend.base_url, "http://search.lan:8080");
    assert_eq!(loaded.search.context_size, 3);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "[backend]\nbase_url = \"\"\n").unwrap();
    assert!(load_or_create_at(&path).is_err());

    std::fs::write(&path, "this is = = not toml").unwrap();
    assert!(load_or_create_at(&path).is_err());
}
