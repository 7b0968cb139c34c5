use std::collections::HashMap;

use super::*;

fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse(None, 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    let val: usize = env_parse(Some("99".to_owned()), 0);
    assert_eq!(val, 99);
}

#[test]
fn env_parse_present_invalid_returns_default() {
    let val: u32 = env_parse(Some("notanumber".to_owned()), 7);
    assert_eq!(val, 7);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn database_url_is_required() {
    let err = Config::from_source(source(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn blank_database_url_is_missing() {
    let err = Config::from_source(source(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn defaults_apply_when_unset() {
    let config = Config::from_source(source(&[("DATABASE_URL", "postgres://localhost/db")])).unwrap();
    assert_eq!(
        config,
        Config {
            database_url: "postgres://localhost/db".to_owned(),
            port: 3000,
            db_max_connections: 5,
            default_width: 800,
            default_height: 600,
        }
    );
}

#[test]
fn overrides_are_parsed() {
    let config = Config::from_source(source(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", "8080"),
        ("DB_MAX_CONNECTIONS", " 12 "),
        ("DIAGRAM_DEFAULT_WIDTH", "1024"),
        ("DIAGRAM_DEFAULT_HEIGHT", "768"),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.db_max_connections, 12);
    assert_eq!(config.default_width, 1024);
    assert_eq!(config.default_height, 768);
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let config = Config::from_source(source(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", "99999"),
        ("DIAGRAM_DEFAULT_WIDTH", "-5"),
        ("DIAGRAM_DEFAULT_HEIGHT", "0"),
    ]))
    .unwrap();
    assert_eq!(config.port, 3000);
    assert_eq!(config.default_width, 800);
    assert_eq!(config.default_height, 600);
}
