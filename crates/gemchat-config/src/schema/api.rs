//! Generative Language API connection settings.

use serde::{Deserialize, Serialize};

/// API connection configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key. `GEMINI_API_KEY` overrides this at load time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub connect_timeout_secs: u64,
    /// Deadline for a non-streamed reply; idle limit between streamed chunks.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: gemchat_common::DEFAULT_MODEL_ID.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}
