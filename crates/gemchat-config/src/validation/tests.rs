//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = GemchatConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_unknown_model() {
    let mut config = GemchatConfig::default();
    config.api.model = "gemini-ultra-9000".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.model"));
}

#[test]
fn catches_temperature_out_of_range() {
    let mut config = GemchatConfig::default();
    config.generation.temperature = 2.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.temperature"));
}

#[test]
fn catches_top_p_out_of_range() {
    let mut config = GemchatConfig::default();
    config.generation.top_p = 1.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.top_p"));
}

#[test]
fn catches_top_k_zero() {
    let mut config = GemchatConfig::default();
    config.generation.top_k = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.top_k"));
}

#[test]
fn catches_zero_timeouts() {
    let mut config = GemchatConfig::default();
    config.api.connect_timeout_secs = 0;
    config.api.request_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.connect_timeout_secs"));
    assert!(err.contains("api.request_timeout_secs"));
}

#[test]
fn catches_non_http_database_url() {
    let mut config = GemchatConfig::default();
    config.store.database_url = "ftp://example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("store.database_url"));
}

#[test]
fn empty_database_url_is_allowed() {
    let mut config = GemchatConfig::default();
    config.store.database_url = String::new();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_excessive_simulated_delay() {
    let mut config = GemchatConfig::default();
    config.execution.simulated_delay_ms = 60_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("execution.simulated_delay_ms"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = GemchatConfig::default();
    config.generation.temperature = -1.0;
    config.generation.max_output_tokens = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.temperature"));
    assert!(err.contains("generation.max_output_tokens"));
    assert!(err.contains("; "));
}
