//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;
use termdeck_common::ConfigError;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_termdeck_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[shell]
program = "/bin/bash"
working_directory = "/repo"

[terminal.theme]
background = "#101010"
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.shell.program, "/bin/bash");
    assert_eq!(config.shell.default_cwd(), "/repo");
    assert_eq!(config.terminal.theme.background, "#101010");
    // Defaults preserved
    assert_eq!(config.terminal.theme.foreground, "#d4d4d4");
    assert_eq!(config.terminal.max_sessions, 4);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_config_with_invalid_values_returns_parsed_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[terminal]\nsettle_delay_ms = 99999\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.terminal.settle_delay_ms, 99_999);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("termdeck").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.terminal.scrollback_lines, 10_000);
    assert!(config.shell.login_shell);
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::TermdeckConfig;

    let content = default_config_toml();
    let config: TermdeckConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.terminal.max_sessions, 4);
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_is_reasonable() {
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("termdeck"));
        assert!(path_str.ends_with("config.toml"));
    }
}
