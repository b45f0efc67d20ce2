//! Tests for configuration validation

use island_queue::config::{ServiceConfig, TenantSettings};
use island_queue::util::ChannelId;

#[test]
fn test_default_config_is_valid() {
    let cfg = ServiceConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.sweep_interval().as_secs(), 300);
    assert_eq!(cfg.max_island_age_hours, 10);
    assert_eq!(cfg.island_id_digits, 3);
}

#[test]
fn test_invalid_timeout_bounds() {
    let cfg = ServiceConfig {
        min_visitor_timeout_minutes: 60,
        max_visitor_timeout_minutes: 30,
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = ServiceConfig {
        default_visitor_timeout_minutes: 500,
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_sweep_interval() {
    let cfg = ServiceConfig {
        sweep_interval_secs: 0,
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_partial_json_config_takes_defaults() {
    let cfg = ServiceConfig::from_json_str(r#"{ "sweep_interval_secs": 60, "allow_self_join": true }"#)
        .unwrap();
    assert_eq!(cfg.sweep_interval_secs, 60);
    assert!(cfg.allow_self_join);
    assert_eq!(cfg.command_prefix, "!");
}

#[test]
fn test_json_config_rejects_invalid_values() {
    assert!(ServiceConfig::from_json_str(r#"{ "island_id_digits": 0 }"#).is_err());
    assert!(ServiceConfig::from_json_str("not json").is_err());
}

#[test]
fn test_env_overrides() {
    std::env::set_var("ISLAND_QUEUE_MAX_ISLAND_AGE_HOURS", "6");
    std::env::set_var("ISLAND_QUEUE_COMMAND_PREFIX", "?");
    let cfg = ServiceConfig::from_env().unwrap();
    assert_eq!(cfg.max_island_age_hours, 6);
    assert_eq!(cfg.command_prefix, "?");

    std::env::set_var("ISLAND_QUEUE_MAX_ISLAND_AGE_HOURS", "six");
    let err = ServiceConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("ISLAND_QUEUE_MAX_ISLAND_AGE_HOURS"));

    std::env::remove_var("ISLAND_QUEUE_MAX_ISLAND_AGE_HOURS");
    std::env::remove_var("ISLAND_QUEUE_COMMAND_PREFIX");
}

#[test]
fn test_tenant_row_column_names() {
    let row: TenantSettings =
        serde_json::from_str(r#"{ "TurnipChannel": 42, "GeneralChannel": null, "Timeout": null }"#)
            .unwrap();
    assert_eq!(row.turnip_channel, Some(ChannelId(42)));
    assert_eq!(row.general_channel, None);
    assert_eq!(row.timeout_minutes, 30);

    let json = serde_json::to_value(TenantSettings::with_timeout(15)).unwrap();
    assert_eq!(json["Timeout"], 15);
}
