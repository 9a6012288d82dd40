//! Unit tests for configuration and graceful degradation
//!
//! Uses serial_test to prevent ENV variable races: tests that touch
//! KARMAD_ROOT_FOLDER or KARMAD_ROOT are marked with #[serial].

use karmad_common::config::{
    load_or_default, load_toml_config, write_toml_config, LoggingConfig, Paths,
    RootFolderResolver, TomlConfig, ROOT_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    env::remove_var(ROOT_ENV);
    env::set_var(ROOT_FOLDER_ENV, "/tmp/karmad-test-env-folder");

    let root_folder = RootFolderResolver::new().resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/karmad-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_root_folder_var_takes_precedence() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/karmad-priority-1");
    env::set_var(ROOT_ENV, "/tmp/karmad-priority-2");

    let root_folder = RootFolderResolver::new().resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/karmad-priority-1"));

    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(ROOT_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::remove_var(ROOT_ENV);
    env::set_var(ROOT_FOLDER_ENV, "/tmp/karmad-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/karmad-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new().with_toml_config(&config).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/karmad-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(ROOT_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/karmad-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new().with_toml_config(&config).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/karmad-toml"));
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_or_default(Some(&dir.path().join("missing.toml")));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_invalid_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [not toml").unwrap();

    assert!(load_toml_config(&path).is_err());
    assert_eq!(load_or_default(Some(&path)), TomlConfig::default());
}

#[test]
fn test_write_then_load_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/srv/karmad")),
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: None,
        },
        madlib_dir: Some(PathBuf::from("exports")),
        ..Default::default()
    };

    write_toml_config(&config, &path).unwrap();
    assert_eq!(load_toml_config(&path).unwrap(), config);
}

#[test]
fn test_paths_ensure_directories_idempotent() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::resolve(&dir.path().join("root"), &TomlConfig::default());

    paths.ensure_directories().unwrap();
    paths.ensure_directories().unwrap();

    assert!(paths.karaoke_dir.is_dir());
    assert!(paths.madlib_template_dir.is_dir());
    assert!(paths.filled_madlib_dir.is_dir());
    assert!(paths.madlib_dir.is_dir());
}
