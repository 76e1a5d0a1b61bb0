//! Startup wiring: config, logging, store, identity and the client factory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gemchat_ai::tools::run_code_tool;
use gemchat_ai::{
    system_instruction, AiError, GeminiClient, GeminiConfig, GenerationClient, GenerationParams,
};
use gemchat_common::{ChatSettings, ConfigError};
use gemchat_config::schema::StoreBackend;
use gemchat_config::GemchatConfig;
use gemchat_store::{
    default_identity_path, FirebaseStore, Identity, MemoryStore, SessionStore, StoreScope,
};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::controller::ClientFactory;

/// Load the config named on the command line or the default one. On failure
/// the defaults are used and the error is handed back for logging once the
/// subscriber is up.
pub fn load_config(args: &Args) -> (GemchatConfig, Option<ConfigError>) {
    let loaded = match args.config {
        Some(ref path) => gemchat_config::load_config_from(path),
        None => gemchat_config::load_config(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = GemchatConfig::default();
            gemchat_config::apply_env_overrides(&mut config);
            (config, Some(e))
        }
    }
}

/// Where settings changes are written back.
pub fn config_path(args: &Args) -> Option<PathBuf> {
    match args.config {
        Some(ref path) => Some(path.clone()),
        None => gemchat_config::toml_loader::default_config_path().ok(),
    }
}

pub fn init_logging(directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| "gemchat=info".parse().unwrap()),
            ),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Model and toggles to start with; a bad `--model` falls back to the
/// configured one.
pub fn initial_settings(config: &GemchatConfig, model_override: Option<&str>) -> ChatSettings {
    if let Some(model) = model_override {
        match ChatSettings::new(model, config.features) {
            Ok(settings) => return settings,
            Err(e) => tracing::warn!("Ignoring --model: {e}"),
        }
    }
    ChatSettings::new(&config.api.model, config.features).unwrap_or_else(|e| {
        tracing::warn!("Configured model rejected, using default: {e}");
        ChatSettings::default()
    })
}

pub fn open_store(config: &GemchatConfig, force_memory: bool) -> Arc<dyn SessionStore> {
    if force_memory || config.store.backend == StoreBackend::Memory {
        tracing::info!("Sessions are kept in memory only");
        return Arc::new(MemoryStore::new());
    }

    let url = config.store.database_url.trim();
    if url.is_empty() {
        tracing::warn!("store.database_url is not set, keeping sessions in memory");
        return Arc::new(MemoryStore::new());
    }

    let timeout = Duration::from_secs(config.api.request_timeout_secs.max(1));
    match FirebaseStore::new(url, config.store.auth_token.clone(), timeout) {
        Ok(store) => {
            tracing::info!(url, "Using Firebase session store");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Firebase store unavailable, keeping sessions in memory: {e}");
            Arc::new(MemoryStore::new())
        }
    }
}

/// The persisted local identity, or a throwaway one if it cannot be stored.
pub fn identity() -> Identity {
    let loaded = default_identity_path().and_then(|path| Identity::load_or_create(&path));
    loaded.unwrap_or_else(|e| {
        tracing::warn!("Identity not persisted, sessions will not survive restart: {e}");
        Identity::generate()
    })
}

pub fn store_scope(identity: &Identity, config: &GemchatConfig) -> StoreScope {
    StoreScope::new(
        identity.user_id.clone(),
        config.api.key.clone().unwrap_or_default(),
    )
}

/// Factory building a fresh [`GeminiClient`] for each settings change. The
/// system instruction and tool list follow the toggles in effect.
pub fn client_factory(config: &GemchatConfig) -> ClientFactory {
    let api_key = config.api.key.clone();
    let base_url = config.api.base_url.clone();
    let connect_timeout = Duration::from_secs(config.api.connect_timeout_secs);
    let request_timeout = Duration::from_secs(config.api.request_timeout_secs);
    let params = GenerationParams {
        temperature: config.generation.temperature,
        top_k: config.generation.top_k,
        top_p: config.generation.top_p,
        max_output_tokens: config.generation.max_output_tokens,
    };

    Box::new(move |settings: &ChatSettings| -> Result<Arc<dyn GenerationClient>, AiError> {
        let key = api_key.as_deref().ok_or_else(|| {
            AiError::Init(format!(
                "no API key; set {} or api.key in the config",
                gemchat_config::API_KEY_ENV
            ))
        })?;

        let features = settings.features();
        let tools = if features.code_execution {
            vec![run_code_tool()]
        } else {
            Vec::new()
        };
        let config = GeminiConfig::new(key)
            .with_model(settings.model().id)
            .with_base_url(base_url.as_str())
            .with_system_instruction(Some(system_instruction(&features, settings.model())))
            .with_params(params)
            .with_tools(tools)
            .with_timeouts(connect_timeout, request_timeout);

        let client: Arc<dyn GenerationClient> = Arc::new(GeminiClient::new(config)?);
        Ok(client)
    })
}

/// Write the current model and toggles back to the config file. The file is
/// re-read first so keys that came from the environment are not written.
pub fn save_settings(path: &std::path::Path, settings: &ChatSettings) -> Result<(), ConfigError> {
    let mut config = if path.exists() {
        gemchat_config::toml_loader::load_from_path(path)?
    } else {
        GemchatConfig::default()
    };
    config.api.model = settings.model().id.to_string();
    config.features = settings.features();
    gemchat_config::save_config_to_path(&config, path)
}
