//! Unit tests for configuration and graceful degradation
//!
//! Covers:
//! - Missing or malformed TOML files never abort startup
//! - Priority order CLI > environment > TOML > compiled default
//! - Root folder creation on first run
//!
//! Tests that manipulate LCX_* environment variables are marked #[serial]
//! so they do not race each other.

use lcx_common::config::{
    load_toml_config, load_toml_config_or_default, resolve_setting, CompiledDefaults,
    RootFolderInitializer, RootFolderResolver, TomlConfig, ENV_ROOT_FOLDER,
};
use lcx_common::SkillAttribution;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.bind_addr, "127.0.0.1:3001");
    assert_eq!(defaults.refresh_interval_ms, 5000);
    assert!(defaults.request_timeout_ms < defaults.refresh_interval_ms);
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let resolver = RootFolderResolver::new(None, &TomlConfig::default());
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/lcx-test-env-folder");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lcx-test-toml-folder")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new(None, &toml).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/lcx-test-env-folder"));

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/lcx-test-env-folder");

    let resolver = RootFolderResolver::new(
        Some(PathBuf::from("/tmp/lcx-test-cli-folder")),
        &TomlConfig::default(),
    );
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/lcx-test-cli-folder"));

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_resolve_setting_ignores_unparsable_env() {
    env::set_var("LCX_TEST_REFRESH_MS", "soon");
    let value = resolve_setting(None, "LCX_TEST_REFRESH_MS", Some(2500u64), 5000);
    assert_eq!(value, 2500);

    env::set_var("LCX_TEST_REFRESH_MS", "1200");
    let value = resolve_setting(None, "LCX_TEST_REFRESH_MS", Some(2500u64), 5000);
    assert_eq!(value, 1200);

    env::remove_var("LCX_TEST_REFRESH_MS");
    let value = resolve_setting(None, "LCX_TEST_REFRESH_MS", None, 5000u64);
    assert_eq!(value, 5000);
}

#[test]
fn test_load_toml_config_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/lcx"

[store]
bind = "0.0.0.0:8080"

[dashboard]
store_url = "http://survey.local:8080"
refresh_interval_ms = 2000
skill_attribution = "primary_skill_only"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).expect("should parse");
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/lcx")));
    assert_eq!(config.store.bind.as_deref(), Some("0.0.0.0:8080"));
    assert_eq!(config.dashboard.refresh_interval_ms, Some(2000));
    assert_eq!(config.dashboard.request_timeout_ms, None);
    assert_eq!(
        config.dashboard.skill_attribution,
        Some(SkillAttribution::PrimarySkillOnly)
    );
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
    assert_eq!(config.logging.level_or_default(), "debug");
}

#[test]
fn test_log_level_falls_back_to_compiled_default() {
    let config: TomlConfig = toml::from_str("[logging]\n").unwrap();
    assert_eq!(config.logging.level, None);
    assert_eq!(
        config.logging.level_or_default(),
        CompiledDefaults::for_current_platform().log_level
    );
    assert_eq!(TomlConfig::default().logging.level_or_default(), "info");
}

#[test]
fn test_malformed_config_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [not toml").unwrap();

    assert!(load_toml_config(&path).is_err());

    let config = load_toml_config_or_default(Some(&path));
    assert!(config.root_folder.is_none());
    assert!(config.store.bind.is_none());
}

#[test]
fn test_missing_config_file_does_not_error() {
    let config = load_toml_config_or_default(Some(&PathBuf::from(
        "/nonexistent/lcx-test/config.toml",
    )));
    assert!(config.root_folder.is_none());
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/lcx-test-root");
    let initializer = RootFolderInitializer::new(root.clone());
    assert_eq!(initializer.database_path(), root.join("lcx.db"));
}

#[test]
fn test_initializer_creates_directory_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("first-run");
    let initializer = RootFolderInitializer::new(root.clone());

    assert!(!initializer.database_exists());
    initializer.ensure_directory_exists().expect("first call creates");
    initializer.ensure_directory_exists().expect("second call is a no-op");

    assert!(root.is_dir());
}
