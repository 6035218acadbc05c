use persistence_middleware::config::{Config, ConfigError, LoggingConfig, MemoryConfig};

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.memory.change_buffer, 64);
    assert_eq!(config.logging.filter, "info");
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("persistence-middleware/config.toml"));
}

#[test]
fn test_validation_passes_for_default() {
    assert!(Config::default().validate().is_ok());
}

/// Test validation rejects a zero-capacity change feed.
#[test]
fn test_validation_fails_zero_change_buffer() {
    let config = Config {
        memory: MemoryConfig { change_buffer: 0 },
        ..Config::default()
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("memory.change_buffer"));
        }
        _ => panic!("Expected ValidationError"),
    }
}

#[test]
fn test_validation_fails_blank_log_filter() {
    let config = Config {
        logging: LoggingConfig {
            filter: "   ".to_string(),
        },
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// Test that sections and fields missing from the file fall back to defaults.
#[test]
fn test_parse_partial_toml() {
    let toml_content = r#"
[memory]
change_buffer = 8

[logging]
filter = "persistence_middleware=debug"
"#;

    let config: Config = toml::from_str(toml_content).expect("Should parse valid TOML");

    assert_eq!(config.memory.change_buffer, 8);
    assert_eq!(config.logging.filter, "persistence_middleware=debug");
}

#[test]
fn test_config_roundtrip() {
    let original = Config {
        memory: MemoryConfig { change_buffer: 3 },
        ..Config::default()
    };
    let serialized = toml::to_string(&original).expect("Should serialize");
    let deserialized: Config = toml::from_str(&serialized).expect("Should deserialize");

    assert_eq!(original, deserialized);
}

/// Test that a missing file yields the defaults.
#[test]
fn test_load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

/// Test the real user flow: write TOML, load, validate.
#[test]
fn test_load_from_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[memory]\nchange_buffer = 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }), "got: {err}");
}

#[test]
fn test_load_from_reports_parse_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml [[[").unwrap();

    match Config::load_from(&path).unwrap_err() {
        ConfigError::ParseError { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {other}"),
    }
}
