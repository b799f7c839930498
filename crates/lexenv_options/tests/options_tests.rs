//! lexenv.json parsing tests.

use lexenv_options::{parse_options, parse_options_file, ConfigError, EnvOptions, ProjectConfig};
use std::io::Write;

// ============================================================================
// parse_options
// ============================================================================

#[test]
fn test_parse_full_config() {
    let config = parse_options(
        r#"{
            "envOptions": {
                "strictRedeclaration": true,
                "maxSlotsPerScope": 128,
                "rootIsBoundary": true,
                "reuseScopes": false,
                "seedBindings": { "out": "java.io.PrintStream", "count": "int" }
            },
            "files": ["a.trace", "b.trace"]
        }"#,
    )
    .unwrap();

    let options = config.options();
    assert!(options.is_strict());
    assert_eq!(options.slot_limit(), 128);
    assert!(options.root_boundary());
    assert!(!options.reuse_enabled());
    let seeds: Vec<_> = options.seeds().collect();
    assert_eq!(seeds, vec![("count", "int"), ("out", "java.io.PrintStream")]);
    assert_eq!(config.files.as_deref(), Some(&["a.trace".to_string(), "b.trace".to_string()][..]));
}

#[test]
fn test_parse_empty_config() {
    let config = parse_options("{}").unwrap();
    assert_eq!(config, ProjectConfig::default());
    assert!(config.options().reuse_enabled());
    assert!(!config.options().has_seeds());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = parse_options(r#"{ "envOptions": { "colour": "blue" } }"#).unwrap();
    assert_eq!(config.options(), EnvOptions::default());
}

#[test]
fn test_wrong_type_is_rejected() {
    let err = parse_options(r#"{ "envOptions": { "maxSlotsPerScope": "lots" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_zero_slot_limit_is_rejected() {
    let err = parse_options(r#"{ "envOptions": { "maxSlotsPerScope": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_bad_seed_name_is_rejected() {
    let err = parse_options(r#"{ "envOptions": { "seedBindings": { "two words": "int" } } }"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = parse_options(r#"{ "envOptions": { "seedBindings": { "x": "" } } }"#).unwrap_err();
    assert!(err.to_string().contains("no native class"));
}

// ============================================================================
// parse_options_file
// ============================================================================

#[test]
fn test_parse_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "envOptions": {{ "strictRedeclaration": true }}, "files": ["main.trace"] }}"#)
        .unwrap();

    let config = parse_options_file(file.path()).unwrap();
    assert!(config.options().is_strict());

    let base = file.path().parent().unwrap();
    assert_eq!(config.resolved_files(base), vec![base.join("main.trace")]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("lexenv.json");
    let err = parse_options_file(&missing).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("expected an I/O error, got {other}"),
    }
}

#[test]
fn test_starter_written_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexenv.json");
    std::fs::write(&path, ProjectConfig::starter().to_json().unwrap()).unwrap();

    let config = parse_options_file(&path).unwrap();
    assert!(config.options().has_seeds());
    assert_eq!(config.options().slot_limit(), 65535);
}
