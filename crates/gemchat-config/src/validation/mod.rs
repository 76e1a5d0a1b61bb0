//! Full configuration validation.
//!
//! Validates numeric ranges, the model id and the store URL, collecting
//! every problem into a single `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::GemchatConfig;
use gemchat_common::ConfigError;

use helpers::{validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &GemchatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_api(&mut errors, config);
    validate_generation(&mut errors, config);
    validate_store(&mut errors, config);
    validate_execution(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_api(errors: &mut Vec<String>, config: &GemchatConfig) {
    if gemchat_common::find_model(&config.api.model).is_none() {
        errors.push(format!("api.model = {:?} is not a known model", config.api.model));
    }
    if config.api.connect_timeout_secs == 0 {
        errors.push("api.connect_timeout_secs must be at least 1".into());
    }
    if config.api.request_timeout_secs == 0 {
        errors.push("api.request_timeout_secs must be at least 1".into());
    }
    if !is_http_url(&config.api.base_url) {
        errors.push(format!("api.base_url = {:?} is not an http(s) URL", config.api.base_url));
    }
}

fn validate_generation(errors: &mut Vec<String>, config: &GemchatConfig) {
    let generation = &config.generation;
    validate_range_f64(errors, "generation.temperature", generation.temperature, 0.0, 2.0);
    validate_range_f64(errors, "generation.top_p", generation.top_p, 0.0, 1.0);
    validate_range(errors, "generation.top_k", generation.top_k, 1, 100);
    validate_range(
        errors,
        "generation.max_output_tokens",
        generation.max_output_tokens,
        1,
        65536,
    );
}

fn validate_store(errors: &mut Vec<String>, config: &GemchatConfig) {
    let url = &config.store.database_url;
    if !url.is_empty() && !is_http_url(url) {
        errors.push(format!("store.database_url = {url:?} is not an http(s) URL"));
    }
}

fn validate_execution(errors: &mut Vec<String>, config: &GemchatConfig) {
    if config.execution.simulated_delay_ms > 10_000 {
        errors.push(format!(
            "execution.simulated_delay_ms = {} is out of range [0, 10000]",
            config.execution.simulated_delay_ms
        ));
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
