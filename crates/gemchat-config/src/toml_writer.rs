//! Write GemchatConfig to TOML on disk.
//!
//! Supports atomic writes (write to `.tmp`, then rename) to prevent
//! corruption if the process crashes mid-write.

use std::path::Path;

use gemchat_common::ConfigError;

use crate::schema::GemchatConfig;

/// Write config to a specific path.
///
/// Creates parent directories if they don't exist. Uses atomic write
/// (write to `.tmp` file, then rename) to prevent partial writes.
pub fn save_config_to_path(config: &GemchatConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write config to {}: {e}",
            tmp_path.display()
        ))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Rename failed, fall back to a direct write (Windows)
        tracing::warn!("atomic rename failed ({}), falling back to direct write", e);
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::ParseError(format!(
                "failed to write config to {}: {e2}",
                path.display()
            ))
        })?;
    }

    tracing::debug!(path = %path.display(), "Config saved to disk");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StoreBackend;
    use tempfile::TempDir;

    #[test]
    fn save_config_writes_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to_path(&GemchatConfig::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: GemchatConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.api.model, "gemini-2.0-flash");
    }

    #[test]
    fn save_config_round_trips_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = GemchatConfig::default();
        config.api.model = "gemini-1.0-pro".into();
        config.features.thinking = true;
        config.store.backend = StoreBackend::Memory;
        save_config_to_path(&config, &path).unwrap();

        let loaded = crate::toml_loader::load_from_path(&path).unwrap();
        assert_eq!(loaded.api.model, "gemini-1.0-pro");
        assert!(loaded.features.thinking);
        assert_eq!(loaded.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn save_config_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        save_config_to_path(&GemchatConfig::default(), &path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn save_config_omits_unset_secrets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        save_config_to_path(&GemchatConfig::default(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("auth_token"));
        assert!(!contents.contains("key ="));
    }
}
