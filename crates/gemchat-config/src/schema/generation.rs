//! Sampling parameters sent with every generation request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    /// Valid range: 1-100.
    pub top_k: u32,
    /// Valid range: 0.0-1.0.
    pub top_p: f64,
    /// Valid range: 1-65536.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}
