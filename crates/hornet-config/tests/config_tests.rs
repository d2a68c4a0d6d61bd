//! Configuration loading and precedence tests

use hornet_config::{ConfigError, ConfigLoader, Settings, PROJECT_FILE};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join(PROJECT_FILE);
    fs::write(&config_path, content).unwrap();
    config_path
}

/// Loader whose global config lives at `<dir>/global.toml`
fn loader_in(dir: &Path) -> ConfigLoader {
    ConfigLoader::with_global_config(dir.join("global.toml"))
}

fn clear_env() {
    env::remove_var("HORNET_MODE");
    env::remove_var("HORNET_GC");
    env::remove_var("HORNET_NETWORK");
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
#[serial]
fn test_load_project_config_basic() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[session]
mode = "worker"

[solver]
gc = true
gc_threshold = 2048
"#,
    );

    let config = loader_in(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(config.is_project());
    assert_eq!(config.mode(), "worker");
    assert!(config.gc());
    assert_eq!(config.gc_threshold(), 2048);
}

#[test]
#[serial]
fn test_load_from_subdirectory_finds_parent() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[permissions]\nnetwork = \"allow\"\n");

    let nested = temp_dir.path().join("sub1").join("sub2");
    fs::create_dir_all(&nested).unwrap();

    let config = loader_in(temp_dir.path()).load_from_directory(&nested).unwrap();

    assert!(config.network_allowed());
    assert_eq!(config.project_root(), Some(temp_dir.path()));
}

#[test]
#[serial]
fn test_empty_config_is_a_project_with_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "");

    let config = loader_in(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(config.is_project());
    assert_eq!(config.mode(), "in-process");
    assert!(!config.gc());
    assert!(!config.network_allowed());
}

#[test]
#[serial]
fn test_load_from_specific_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[solver]\ngc = true\n");

    let config = loader_in(temp_dir.path()).load_from_file(&path).unwrap();

    assert!(config.gc());
    assert_eq!(config.project_root(), Some(temp_dir.path()));
}

#[test]
fn test_missing_specific_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");
    let result = loader_in(temp_dir.path()).load_from_file(&path);
    assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == path));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_invalid_toml_syntax() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[session\nmode = ");
    let result = Settings::load_from_file(&path);
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[rstest]
#[case("[session]\nmode = \"worker\"\nthreads = 4\n")]
#[case("[compiler]\noptimize = true\n")]
#[case("[permissions]\nfilesystem = \"allow\"\n")]
fn test_unknown_field_rejected(#[case] content: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), content);
    let result = Settings::load_from_file(&path);
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[rstest]
#[case("[session]\nmode = \"remote\"\n", "session.mode")]
#[case("[solver]\ngc_threshold = 0\n", "solver.gc_threshold")]
#[case("[permissions]\nnetwork = \"sometimes\"\n", "permissions.network")]
fn test_invalid_values_name_their_field(#[case] content: &str, #[case] expected: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), content);
    match Settings::load_from_file(&path) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected invalid value, got {:?}", other),
    }
}

// ============================================================================
// Precedence Tests
// ============================================================================

#[test]
#[serial]
fn test_project_overrides_global_field_by_field() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("global.toml"),
        r#"
[session]
mode = "worker"

[solver]
gc = true
gc_threshold = 100
"#,
    )
    .unwrap();
    create_config_file(temp_dir.path(), "[solver]\ngc_threshold = 500\n");

    let config = loader_in(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert_eq!(config.mode(), "worker");
    assert!(config.gc());
    assert_eq!(config.gc_threshold(), 500);
}

#[test]
#[serial]
fn test_invalid_global_config_is_reported() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("global.toml"), "[session]\nmode = 3\n").unwrap();

    let result = loader_in(temp_dir.path()).load_from_directory(temp_dir.path());
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[rstest]
#[case("true", true)]
#[case("1", true)]
#[case("YES", true)]
#[case("false", false)]
#[case("off", false)]
#[serial]
fn test_env_override_gc(#[case] value: &str, #[case] expected: bool) {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[solver]\ngc = true\n");

    env::set_var("HORNET_GC", value);
    let config = loader_in(temp_dir.path()).load_from_directory(temp_dir.path());
    clear_env();

    assert_eq!(config.unwrap().gc(), expected);
}

#[test]
#[serial]
fn test_env_override_network() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[permissions]\nnetwork = \"deny\"\n");

    env::set_var("HORNET_NETWORK", "allow");
    let config = loader_in(temp_dir.path()).load_from_directory(temp_dir.path());
    clear_env();

    assert!(config.unwrap().network_allowed());
}

#[test]
#[serial]
fn test_invalid_env_network_is_rejected() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    env::set_var("HORNET_NETWORK", "prompt");
    let result = loader_in(temp_dir.path()).load_from_directory(temp_dir.path());
    clear_env();

    match result {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "HORNET_NETWORK"),
        other => panic!("expected invalid value, got {:?}", other),
    }
}
