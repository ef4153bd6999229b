use std::fs;

use lumencue_core::{EngineError, LogConfig, LumencueConfig};
use tempfile::tempdir;

#[test]
fn test_config_save_and_load() {
    // 1. Setup
    let dir = tempdir().unwrap();
    let path = dir.path().join("lumencue.toml");

    let mut config = LumencueConfig::default();
    config.transport.port = 47000;
    config.wall_light.target = "10.0.0.5:9000".to_string();
    config.pixels.strip_length = 144;
    config.pixels.refresh_rate = 30.0;
    config.logging.level = "debug".to_string();

    // 2. Persist
    config.save(&path).unwrap();
    let loaded = LumencueConfig::load(&path).unwrap();

    // 3. Verify
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.wall_light.target_addr().unwrap(),
        "10.0.0.5:9000".parse().unwrap()
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = LumencueConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = LumencueConfig::from_toml_str("[transport\nport = 1").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));

    let err = LumencueConfig::from_toml_str("[transport]\nport = \"high\"\n").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_log_directory_created_only_for_file_output() {
    let dir = tempdir().unwrap();
    let mut config = LogConfig {
        log_dir: dir.path().join("logs"),
        ..Default::default()
    };

    config.ensure_log_directory().unwrap();
    assert!(!config.log_dir.exists());

    config.file_output = true;
    config.ensure_log_directory().unwrap();
    assert!(config.log_dir.is_dir());
}

#[test]
fn test_cleanup_keeps_newest_logs() {
    let dir = tempdir().unwrap();
    let config = LogConfig {
        file_output: true,
        log_dir: dir.path().to_path_buf(),
        max_files: 3,
        ..Default::default()
    };

    for day in 1..=5 {
        fs::write(
            dir.path().join(format!("lumencue_2024-01-0{}_00-00-00.log", day)),
            "",
        )
        .unwrap();
    }
    fs::write(dir.path().join("unrelated.log"), "").unwrap();
    fs::write(dir.path().join("lumencue_notes.txt"), "").unwrap();

    // Room is left for the log this session is about to write
    assert_eq!(config.cleanup_old_logs().unwrap(), 3);

    let mut remaining: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            "lumencue_2024-01-04_00-00-00.log",
            "lumencue_2024-01-05_00-00-00.log",
            "lumencue_notes.txt",
            "unrelated.log",
        ]
    );
}
