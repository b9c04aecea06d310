use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.port, 4000);
    assert_eq!(cfg.database_url, None);
    assert_eq!(cfg.ping_interval, Duration::from_secs(25));
    assert_eq!(cfg.client_channel_capacity, 256);
}

#[test]
fn overrides_are_parsed() {
    let cfg = config_from(&[
        ("PORT", "8080"),
        ("DATABASE_URL", "postgres://localhost/wallgame"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("PING_INTERVAL_SECS", " 10 "),
        ("CLIENT_CHANNEL_CAPACITY", "32"),
        ("RATING_TAU", "0.5"),
    ])
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/wallgame"));
    assert_eq!(cfg.db_max_connections, 12);
    assert_eq!(cfg.ping_interval, Duration::from_secs(10));
    assert_eq!(cfg.client_channel_capacity, 32);
    assert!((cfg.rating_tau - 0.5).abs() < f64::EPSILON);
}

#[test]
fn blank_database_url_means_none() {
    let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
    assert_eq!(cfg.database_url, None);
}

#[test]
fn unparseable_values_are_errors() {
    assert_eq!(
        config_from(&[("PORT", "eighty")]),
        Err(ConfigError::Invalid { key: "PORT", value: "eighty".into() })
    );
    assert!(matches!(
        config_from(&[("RATING_TAU", "-1")]),
        Err(ConfigError::Invalid { key: "RATING_TAU", .. })
    ));
    assert_eq!(config_from(&[("PING_INTERVAL_SECS", "0")]), Err(ConfigError::Zero { key: "PING_INTERVAL_SECS" }));
}

#[test]
fn clock_period_is_not_configurable() {
    // Game clocks count whole seconds; a faster ticker would drain them early.
    assert_eq!(config_from(&[("CLOCK_TICK_MS", "250")]).unwrap(), Config::default());
}
