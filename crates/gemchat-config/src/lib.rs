//! gemchat configuration system.
//!
//! TOML-based configuration with validation. All sections use serde
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gemchat_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("model: {}", config.api.model);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::GemchatConfig;
pub use toml_writer::save_config_to_path;

use std::path::Path;

use gemchat_common::ConfigError;

/// Environment variable that overrides `api.key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Load config from the platform default path, creating a commented default
/// file on first run, then apply environment overrides.
pub fn load_config() -> Result<GemchatConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path (no default file is created).
pub fn load_config_from(path: &Path) -> Result<GemchatConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    let mut config = toml_loader::load_from_path(path)?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// `GEMINI_API_KEY` wins over the key stored in the file.
pub fn apply_env_overrides(config: &mut GemchatConfig) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.api.key = Some(key.trim().to_string());
        }
    }
}
